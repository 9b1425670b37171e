use tracing::{debug, warn};

use crate::domain::{EntryKind, UserLedger};

use super::{AppError, CompositionReport, EntryList, LedgerService, Renderer};

/// An event delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text message typed by the user
    Message(String),
    /// A button press carrying the button's callback data
    Callback(String),
}

/// Slash commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Total,
    List,
    Chart,
    Clear,
}

impl BotCommand {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" => Some(BotCommand::Start),
            "help" => Some(BotCommand::Help),
            "total" | "balance" => Some(BotCommand::Total),
            "list" => Some(BotCommand::List),
            "chart" => Some(BotCommand::Chart),
            "clear" => Some(BotCommand::Clear),
            _ => None,
        }
    }
}

/// Split `/name@bot args` into the command name, if the text is a command.
fn command_name(text: &str) -> Option<&str> {
    let first = text.trim().split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    Some(name.split('@').next().unwrap_or(name))
}

/// Actions encoded in button callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `del:<kind>:<index>`
    Delete { kind: EntryKind, index: usize },
    /// `refresh`
    Refresh,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidCallback(data.to_string());

        if data == "refresh" {
            return Ok(CallbackAction::Refresh);
        }

        let mut parts = data.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("del"), Some(kind), Some(index), None) => {
                let kind = EntryKind::from_str(kind).ok_or_else(invalid)?;
                let index = index.parse::<usize>().map_err(|_| invalid())?;
                Ok(CallbackAction::Delete { kind, index })
            }
            _ => Err(invalid()),
        }
    }

    pub fn data(&self) -> String {
        match self {
            CallbackAction::Delete { kind, index } => format!("del:{}:{}", kind, index),
            CallbackAction::Refresh => "refresh".to_string(),
        }
    }
}

/// A button attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            data: action.data(),
        }
    }
}

/// How the transport should deliver a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Post a new message
    Send,
    /// Replace the message whose button was pressed
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<Button>,
    pub mode: ReplyMode,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            mode: ReplyMode::Send,
        }
    }

    fn edit(mut self) -> Self {
        self.mode = ReplyMode::Edit;
        self
    }
}

/// Routes transport events to ledger operations and renders the replies.
pub struct Dispatcher<'a> {
    service: &'a LedgerService,
    renderer: Renderer,
}

impl<'a> Dispatcher<'a> {
    pub fn new(service: &'a LedgerService, renderer: Renderer) -> Self {
        Self { service, renderer }
    }

    /// Handle one event. Every failure is turned into a user-facing reply.
    pub async fn handle(&self, user_id: &str, inbound: Inbound) -> Reply {
        let is_callback = matches!(inbound, Inbound::Callback(_));

        match self.try_handle(user_id, inbound).await {
            Ok(reply) => reply,
            Err(err) => {
                if err.is_user_error() {
                    warn!(user = user_id, error = %err, "Rejected request");
                }
                let notice = self.renderer.error(&err);
                match err {
                    AppError::IndexOutOfRange { .. } if is_callback => {
                        let mut reply = self.list_view(user_id).await;
                        reply.text = format!("{}\n\n{}", notice, reply.text);
                        reply.edit()
                    }
                    _ => Reply::text(notice),
                }
            }
        }
    }

    /// Handle one event, returning the classified error on failure.
    pub async fn try_handle(&self, user_id: &str, inbound: Inbound) -> Result<Reply, AppError> {
        match inbound {
            Inbound::Message(text) => match command_name(&text) {
                Some(name) => {
                    let command = BotCommand::from_str(name)
                        .ok_or_else(|| AppError::UnknownCommand(name.to_string()))?;
                    self.run_command(user_id, command).await
                }
                None => {
                    let result = self.service.record(user_id, &text).await?;
                    Ok(Reply::text(self.renderer.added(&result)))
                }
            },
            Inbound::Callback(data) => {
                let action = CallbackAction::parse(&data)?;
                self.run_callback(user_id, action).await
            }
        }
    }

    async fn run_command(&self, user_id: &str, command: BotCommand) -> Result<Reply, AppError> {
        debug!(user = user_id, ?command, "Running command");

        match command {
            BotCommand::Start => {
                self.service.start(user_id).await?;
                Ok(Reply::text(self.renderer.help(self.service.vocabulary())))
            }
            BotCommand::Help => Ok(Reply::text(self.renderer.help(self.service.vocabulary()))),
            BotCommand::Total => {
                let totals = self.service.totals(user_id).await;
                Ok(Reply::text(self.renderer.summary(&totals)))
            }
            BotCommand::List => Ok(self.list_view(user_id).await),
            BotCommand::Chart => {
                let ledger = self.service.ledger(user_id).await;
                if ledger.is_empty() {
                    return Ok(Reply::text(self.renderer.empty_ledger()));
                }
                let report = CompositionReport::build(&ledger);
                Ok(Reply::text(self.renderer.chart(&report)))
            }
            BotCommand::Clear => {
                let removed = self.service.clear(user_id).await?;
                Ok(Reply::text(format!("Removed {} entries.", removed)))
            }
        }
    }

    async fn run_callback(&self, user_id: &str, action: CallbackAction) -> Result<Reply, AppError> {
        debug!(user = user_id, ?action, "Running callback");

        match action {
            CallbackAction::Refresh => Ok(self.list_view(user_id).await.edit()),
            CallbackAction::Delete { kind, index } => {
                let result = self.service.delete_entry(user_id, kind, index).await?;
                let mut reply = self.list_view(user_id).await;
                reply.text = format!("{}\n\n{}", self.renderer.deleted(&result), reply.text);
                Ok(reply.edit())
            }
        }
    }

    /// The list of entries with one delete button per entry and a refresh button.
    pub async fn list_view(&self, user_id: &str) -> Reply {
        let ledger = self.service.ledger(user_id).await;
        self.render_list(&ledger)
    }

    /// Sections, buttons and summary all come from the same ledger state.
    pub fn render_list(&self, ledger: &UserLedger) -> Reply {
        let mut sections = Vec::new();
        let mut buttons = Vec::new();
        let mut any = false;

        for kind in EntryKind::ALL {
            let list = EntryList::of(ledger.entries(kind));
            if let EntryList::Entries(entries) = &list {
                any = true;
                for (index, entry) in entries.iter().enumerate() {
                    buttons.push(Button::new(
                        format!("Delete {} {}: {}", kind, index + 1, entry.name),
                        CallbackAction::Delete { kind, index },
                    ));
                }
            }
            sections.push(self.renderer.section(kind, &list));
        }

        if !any {
            return Reply {
                text: self.renderer.empty_ledger(),
                buttons: vec![Button::new("Refresh", CallbackAction::Refresh)],
                mode: ReplyMode::Send,
            };
        }

        sections.push(self.renderer.summary(&ledger.totals()));
        buttons.push(Button::new("Refresh", CallbackAction::Refresh));

        Reply {
            text: sections.join("\n\n"),
            buttons,
            mode: ReplyMode::Send,
        }
    }
}
