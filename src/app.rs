use crate::config;
use crate::directory::{Contact, DirectoryClient};
use crate::event::AppEvent;
use crate::platform::{ComposerKind, ComposerResult, PlatformServices};
use crate::storage::Config;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Command/view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Contacts,    // Contact list (home view)
    Detail,      // One contact's detail screen
    EditContact, // Editing the current contact
}

/// Detail screen lifecycle.
/// Loading carries the id of the request whose completion we accept;
/// anything else that arrives is stale and gets dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Idle,
    Loading { request: Uuid },
    Loaded(Contact),
    LoadFailed,
}

/// An open text or mail composer
#[derive(Debug, Clone)]
pub struct Composer {
    pub kind: ComposerKind,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Set once the send is dispatched; keys are ignored until the
    /// completion event dismisses the composer
    pub sending: bool,
}

/// Main application state
pub struct App {
    /// Application configuration
    pub config: Config,
    /// Contact list (home view rows)
    pub contacts: Vec<Contact>,
    /// Selected contact index in the list
    pub selected_index: usize,
    /// A list refresh is in flight
    pub contacts_loading: bool,

    // Navigation state
    /// Current view
    pub menu_state: MenuState,
    /// Detail screen state machine
    pub detail_state: DetailState,
    /// Id of the contact the detail screen was opened for
    pub detail_contact_id: u64,

    /// Profile picture bytes keyed by URL
    pub avatar_cache: HashMap<String, Vec<u8>>,
    /// URL of the avatar fetch currently in flight
    avatar_pending: Option<String>,

    /// Modal alert message (swallows all input until acknowledged)
    pub alert: Option<String>,
    /// Open composer popup, if any
    pub composer: Option<Composer>,

    // Edit form
    pub edit_first_name: String,
    pub edit_last_name: String,
    pub edit_mobile: String,
    pub edit_email: String,
    pub edit_favorite: bool,
    /// 0-3 text fields, 4 = favorite toggle
    pub edit_selected_field: usize,

    // Status
    /// Status message to display
    pub status_message: String,
    /// Tick counter driving the busy spinner
    pub tick_count: u64,

    /// Should the app quit
    pub should_quit: bool,

    client: DirectoryClient,
    platform: Box<dyn PlatformServices>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    /// Initialize the application
    pub fn initialize(
        config: Config,
        platform: Box<dyn PlatformServices>,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let client = DirectoryClient::new(config.server_url.clone());

        Self {
            config,
            contacts: Vec::new(),
            selected_index: 0,
            contacts_loading: false,

            menu_state: MenuState::Contacts,
            detail_state: DetailState::Idle,
            detail_contact_id: 0,

            avatar_cache: HashMap::new(),
            avatar_pending: None,

            alert: None,
            composer: None,

            edit_first_name: String::new(),
            edit_last_name: String::new(),
            edit_mobile: String::new(),
            edit_email: String::new(),
            edit_favorite: false,
            edit_selected_field: 0,

            status_message: String::new(),
            tick_count: 0,
            should_quit: false,

            client,
            platform,
            event_sender,
        }
    }

    /// Handle incoming events
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => self.tick_count = self.tick_count.wrapping_add(1),
            AppEvent::Paste(text) => self.handle_paste(text),
            AppEvent::ContactsLoaded(result) => self.handle_contacts_loaded(result),
            AppEvent::DetailFetched { request, result } => {
                self.handle_detail_fetched(request, result)
            }
            AppEvent::AvatarLoaded { url, result } => self.handle_avatar_loaded(url, result),
            AppEvent::ComposerFinished { kind, result } => self.finish_composer(kind, result),
            AppEvent::ContactUpdated(contact) => self.handle_contact_updated(contact),
        }
    }

    /// True while the detail fetch is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self.detail_state, DetailState::Loading { .. })
    }

    fn current_contact(&self) -> Option<&Contact> {
        match &self.detail_state {
            DetailState::Loaded(contact) => Some(contact),
            _ => None,
        }
    }

    // ── Contact list ─────────────────────────────────────────────────────────

    /// Kick off a contact list fetch
    pub fn refresh_contacts(&mut self) {
        if self.contacts_loading {
            return;
        }
        self.contacts_loading = true;

        let client = self.client.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = client.fetch_contacts().await;
            let _ = sender.send(AppEvent::ContactsLoaded(result));
        });
    }

    fn handle_contacts_loaded(&mut self, result: Result<Vec<Contact>, String>) {
        self.contacts_loading = false;
        match result {
            Ok(contacts) => {
                self.contacts = contacts;
                if self.selected_index >= self.contacts.len() {
                    self.selected_index = self.contacts.len().saturating_sub(1);
                }
                self.status_message = "".to_string();
            }
            Err(e) => {
                self.status_message = format!("Couldn't load contacts: {}", e);
                crate::logger::log_to_file(&format!("Contact list fetch failed: {}", e));
            }
        }
    }

    // ── Detail screen ────────────────────────────────────────────────────────

    /// Enter the detail screen and fetch the contact from the directory.
    /// Exactly one fetch is issued per entry; the minted request id is the
    /// only completion the screen will accept.
    pub fn open_detail(&mut self, id: u64) {
        self.menu_state = MenuState::Detail;
        self.detail_contact_id = id;
        self.status_message = "".to_string();

        let request = Uuid::new_v4();
        self.detail_state = DetailState::Loading { request };

        let client = self.client.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = client.fetch_contact(id).await;
            let _ = sender.send(AppEvent::DetailFetched { request, result });
        });
    }

    fn handle_detail_fetched(
        &mut self,
        request: Uuid,
        result: Result<Option<Contact>, String>,
    ) {
        // Liveness check: only the fetch this screen entry issued may
        // mutate it. Completions for torn-down screens land here too.
        let expected = match &self.detail_state {
            DetailState::Loading { request } => *request,
            _ => {
                crate::logger::log_to_file(&format!("Dropping stale contact fetch {}", request));
                return;
            }
        };
        if expected != request {
            crate::logger::log_to_file(&format!("Dropping stale contact fetch {}", request));
            return;
        }

        match result {
            Err(e) => {
                crate::logger::log_to_file(&format!(
                    "Contact {} fetch failed: {}",
                    self.detail_contact_id, e
                ));
                self.detail_state = DetailState::LoadFailed;
                self.show_alert(config::ALERT_REQUEST_FAILED);
            }
            Ok(None) => {
                crate::logger::log_to_file(&format!(
                    "Contact {} fetch returned no payload",
                    self.detail_contact_id
                ));
                self.detail_state = DetailState::LoadFailed;
                self.show_alert(config::ALERT_INVALID_RESPONSE);
            }
            Ok(Some(contact)) => {
                self.request_avatar(contact.profile_pic.clone());
                self.detail_state = DetailState::Loaded(contact);
            }
        }
    }

    /// Resolve a profile picture: cache hit renders immediately, otherwise
    /// one byte fetch is issued and the result lands in the cache
    fn request_avatar(&mut self, url: String) {
        if url.is_empty() || self.avatar_cache.contains_key(&url) {
            return;
        }
        if self.avatar_pending.as_deref() == Some(url.as_str()) {
            return;
        }
        self.avatar_pending = Some(url.clone());

        let client = self.client.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = client.fetch_avatar(&url).await;
            let _ = sender.send(AppEvent::AvatarLoaded { url, result });
        });
    }

    fn handle_avatar_loaded(&mut self, url: String, result: Result<Vec<u8>, String>) {
        if self.avatar_pending.as_deref() == Some(url.as_str()) {
            self.avatar_pending = None;
        }
        match result {
            Ok(bytes) => {
                self.avatar_cache.insert(url, bytes);
            }
            Err(e) => {
                // Placeholder stays up; no alert for a missing picture
                crate::logger::log_to_file(&format!("Avatar fetch failed for {}: {}", url, e));
            }
        }
    }

    // ── Outbound actions ─────────────────────────────────────────────────────

    fn on_call_requested(&mut self) {
        let number = self
            .current_contact()
            .map(|c| c.mobile.trim().to_string())
            .unwrap_or_default();

        if number.is_empty() {
            self.show_alert(config::ALERT_PHONE_UNAVAILABLE);
            return;
        }
        if !self.platform.can_dial() {
            self.show_alert(config::ALERT_CANT_CALL);
            return;
        }
        if let Err(e) = self.platform.dial(&number) {
            crate::logger::log_to_file(&format!("Dial failed: {}", e));
            self.show_alert(config::ALERT_CANT_CALL);
        }
    }

    fn on_text_requested(&mut self) {
        let number = self
            .current_contact()
            .map(|c| c.mobile.trim().to_string())
            .unwrap_or_default();

        if number.is_empty() {
            self.show_alert(config::ALERT_PHONE_UNAVAILABLE);
            return;
        }
        if !self.platform.can_send_text() {
            self.show_alert(config::ALERT_CANT_TEXT);
            return;
        }

        self.composer = Some(Composer {
            kind: ComposerKind::Text,
            recipient: number,
            subject: String::new(),
            body: config::TEXT_MESSAGE_BODY.to_string(),
            sending: false,
        });
    }

    fn on_email_requested(&mut self) {
        let email = self
            .current_contact()
            .map(|c| c.email.trim().to_string())
            .unwrap_or_default();

        // A missing address short-circuits before any capability query
        if email.is_empty() {
            self.show_alert(config::ALERT_EMAIL_UNAVAILABLE);
            return;
        }
        if !self.platform.can_send_mail() {
            self.show_alert(config::ALERT_CANT_MAIL);
            return;
        }

        self.composer = Some(Composer {
            kind: ComposerKind::Mail,
            recipient: email,
            subject: config::MAIL_SUBJECT.to_string(),
            body: config::MAIL_BODY.to_string(),
            sending: false,
        });
    }

    // ── Composer ─────────────────────────────────────────────────────────────

    /// Dispatch the open composer through the platform layer. The outcome
    /// comes back as a ComposerFinished event like any other completion.
    fn submit_composer(&mut self) {
        let (kind, recipient, subject, body) = match &self.composer {
            Some(c) if !c.sending => (c.kind, c.recipient.clone(), c.subject.clone(), c.body.clone()),
            _ => return,
        };
        if let Some(composer) = self.composer.as_mut() {
            composer.sending = true;
        }

        let dispatched = match kind {
            ComposerKind::Text => self.platform.send_text(&recipient, &body),
            ComposerKind::Mail => self.platform.send_mail(&recipient, &subject, &body),
        };

        let result = match dispatched {
            Ok(()) => ComposerResult::Sent,
            Err(e) => {
                crate::logger::log_to_file(&format!("Composer dispatch failed: {}", e));
                ComposerResult::Failed
            }
        };
        let _ = self
            .event_sender
            .send(AppEvent::ComposerFinished { kind, result });
    }

    fn cancel_composer(&mut self) {
        let kind = match &self.composer {
            Some(c) if !c.sending => c.kind,
            _ => return,
        };
        let _ = self.event_sender.send(AppEvent::ComposerFinished {
            kind,
            result: ComposerResult::Cancelled,
        });
    }

    /// Cancelled and failed outcomes alert; every outcome dismisses
    fn finish_composer(&mut self, kind: ComposerKind, result: ComposerResult) {
        if matches!(result, ComposerResult::Cancelled | ComposerResult::Failed) {
            let message = match kind {
                ComposerKind::Text => config::ALERT_TEXT_FAILED,
                ComposerKind::Mail => config::ALERT_CANT_MAIL,
            };
            self.show_alert(message);
        }
        self.composer = None;
    }

    // ── Edit screen ──────────────────────────────────────────────────────────

    fn open_edit(&mut self) {
        let contact = match self.current_contact() {
            Some(c) => c.clone(),
            None => return,
        };

        self.edit_first_name = contact.first_name;
        self.edit_last_name = contact.last_name;
        self.edit_mobile = contact.mobile;
        self.edit_email = contact.email;
        self.edit_favorite = contact.favorite;
        self.edit_selected_field = 0;
        self.menu_state = MenuState::EditContact;
        self.status_message = "".to_string();
    }

    /// Save the edit form. Posts exactly one ContactUpdated per save; the
    /// event handler applies it to the detail screen and the list row.
    fn submit_edit(&mut self) {
        let current = match self.current_contact() {
            Some(c) => c.clone(),
            None => {
                self.menu_state = MenuState::Detail;
                return;
            }
        };

        let first_name = self.edit_first_name.trim().to_string();
        if first_name.is_empty() {
            self.status_message = "First name is required".to_string();
            return;
        }

        let updated = Contact {
            id: current.id,
            first_name,
            last_name: self.edit_last_name.trim().to_string(),
            mobile: self.edit_mobile.trim().to_string(),
            email: self.edit_email.trim().to_string(),
            profile_pic: current.profile_pic,
            favorite: self.edit_favorite,
        };

        let _ = self.event_sender.send(AppEvent::ContactUpdated(updated));
        self.menu_state = MenuState::Detail;
        self.status_message = "Contact updated".to_string();
    }

    /// Apply a saved edit: replace the detail screen's contact and patch
    /// the matching list row (the screen's caller)
    fn handle_contact_updated(&mut self, contact: Contact) {
        crate::logger::log_to_file(&format!("Contact {} updated", contact.id));

        if let Some(row) = self.contacts.iter_mut().find(|c| c.id == contact.id) {
            *row = contact.clone();
        }

        if self.detail_contact_id == contact.id
            && matches!(self.menu_state, MenuState::Detail | MenuState::EditContact)
        {
            self.detail_state = DetailState::Loaded(contact);
        }
    }

    // ── Alerts ───────────────────────────────────────────────────────────────

    /// Present a modal alert with a single OK acknowledgement.
    /// No-op for an empty message.
    pub fn show_alert(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.alert = Some(message.to_string());
    }

    // ── Keyboard input ───────────────────────────────────────────────────────

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        // Global shortcuts (work in any mode)
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                _ => {}
            }
        }

        // A modal alert swallows everything but its acknowledgement
        if self.alert.is_some() {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('O')
            ) {
                self.alert = None;
            }
            return;
        }

        if self.composer.is_some() {
            self.handle_composer_key(key);
            return;
        }

        match self.menu_state {
            MenuState::Contacts => self.handle_contacts_key(key),
            MenuState::Detail => self.handle_detail_key(key),
            MenuState::EditContact => self.handle_edit_key(key),
        }
    }

    fn handle_contacts_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }
            KeyCode::Down => {
                if !self.contacts.is_empty() && self.selected_index < self.contacts.len() - 1 {
                    self.selected_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(contact) = self.contacts.get(self.selected_index) {
                    self.open_detail(contact.id);
                }
            }
            KeyCode::Char('r') => self.refresh_contacts(),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        // Interaction is disabled while the fetch is outstanding
        if self.is_busy() {
            return;
        }

        match key.code {
            KeyCode::Esc => {
                // Tear down the screen; the contact is refetched next entry
                self.menu_state = MenuState::Contacts;
                self.detail_state = DetailState::Idle;
                self.status_message = "".to_string();
            }
            KeyCode::Char('c') => self.on_call_requested(),
            KeyCode::Char('t') => self.on_text_requested(),
            KeyCode::Char('m') => self.on_email_requested(),
            KeyCode::Char('e') => self.open_edit(),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                // Cancel: back to detail, nothing delivered
                self.menu_state = MenuState::Detail;
                self.status_message = "".to_string();
            }
            KeyCode::Up => {
                if self.edit_selected_field > 0 {
                    self.edit_selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.edit_selected_field < 4 {
                    self.edit_selected_field += 1;
                }
            }
            KeyCode::Enter => self.submit_edit(),
            KeyCode::Backspace => {
                if let Some(field) = self.edit_field_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(' ') if self.edit_selected_field == 4 => {
                self.edit_favorite = !self.edit_favorite;
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.edit_field_mut() {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_composer_key(&mut self, key: KeyEvent) {
        if self.composer.as_ref().map(|c| c.sending).unwrap_or(false) {
            return;
        }

        match key.code {
            KeyCode::Esc => self.cancel_composer(),
            KeyCode::Enter => self.submit_composer(),
            KeyCode::Backspace => {
                if let Some(composer) = self.composer.as_mut() {
                    composer.body.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(composer) = self.composer.as_mut() {
                    composer.body.push(c);
                }
            }
            _ => {}
        }
    }

    /// Handle paste into the focused text input
    fn handle_paste(&mut self, text: String) {
        if self.alert.is_some() {
            return;
        }

        if let Some(composer) = self.composer.as_mut() {
            if !composer.sending {
                composer.body.push_str(&text);
            }
            return;
        }

        if self.menu_state == MenuState::EditContact {
            if let Some(field) = self.edit_field_mut() {
                field.push_str(&text);
            }
        }
    }

    fn edit_field_mut(&mut self) -> Option<&mut String> {
        match self.edit_selected_field {
            0 => Some(&mut self.edit_first_name),
            1 => Some(&mut self.edit_last_name),
            2 => Some(&mut self.edit_mobile),
            3 => Some(&mut self.edit_email),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Recording platform fake: capability flags are fixed, every dispatch
    /// and capability query is written down
    struct FakePlatform {
        dial_ok: bool,
        text_ok: bool,
        mail_ok: bool,
        opened: Rc<RefCell<Vec<String>>>,
        mail_capability_queries: Rc<RefCell<u32>>,
    }

    impl FakePlatform {
        fn new(dial_ok: bool, text_ok: bool, mail_ok: bool) -> Self {
            Self {
                dial_ok,
                text_ok,
                mail_ok,
                opened: Rc::new(RefCell::new(Vec::new())),
                mail_capability_queries: Rc::new(RefCell::new(0)),
            }
        }
    }

    impl PlatformServices for FakePlatform {
        fn can_dial(&self) -> bool {
            self.dial_ok
        }

        fn can_send_text(&self) -> bool {
            self.text_ok
        }

        fn can_send_mail(&self) -> bool {
            *self.mail_capability_queries.borrow_mut() += 1;
            self.mail_ok
        }

        fn dial(&self, number: &str) -> Result<(), String> {
            self.opened.borrow_mut().push(crate::platform::tel_uri(number));
            Ok(())
        }

        fn send_text(&self, recipient: &str, body: &str) -> Result<(), String> {
            self.opened
                .borrow_mut()
                .push(crate::platform::sms_uri(recipient, body));
            Ok(())
        }

        fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String> {
            self.opened
                .borrow_mut()
                .push(crate::platform::mailto_uri(recipient, subject, body));
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            server_url: "http://127.0.0.1:1".to_string(),
            opener_command: "true".to_string(),
        }
    }

    fn test_app(
        platform: FakePlatform,
    ) -> (
        App,
        mpsc::UnboundedReceiver<AppEvent>,
        Rc<RefCell<Vec<String>>>,
        Rc<RefCell<u32>>,
    ) {
        let opened = platform.opened.clone();
        let mail_queries = platform.mail_capability_queries.clone();
        let (sender, receiver) = mpsc::unbounded_channel();
        let app = App::initialize(test_config(), Box::new(platform), sender);
        (app, receiver, opened, mail_queries)
    }

    fn contact(mobile: &str, email: &str) -> Contact {
        Contact {
            id: 1,
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            mobile: mobile.to_string(),
            email: email.to_string(),
            profile_pic: String::new(),
            favorite: true,
        }
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn load_detail(app: &mut App, c: Contact) {
        let request = Uuid::new_v4();
        app.menu_state = MenuState::Detail;
        app.detail_contact_id = c.id;
        app.detail_state = DetailState::Loading { request };
        app.handle_event(AppEvent::DetailFetched {
            request,
            result: Ok(Some(c)),
        });
    }

    #[tokio::test]
    async fn test_open_detail_enters_loading() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));

        app.open_detail(7);

        assert_eq!(app.menu_state, MenuState::Detail);
        assert!(app.is_busy());
        assert_eq!(app.detail_contact_id, 7);
    }

    #[tokio::test]
    async fn test_input_disabled_while_loading() {
        let (mut app, _rx, opened, _) = test_app(FakePlatform::new(true, true, true));

        app.open_detail(7);
        app.handle_event(key(KeyCode::Char('c')));

        assert!(app.alert.is_none());
        assert!(opened.borrow().is_empty());
        assert!(app.is_busy());
    }

    #[test]
    fn test_fetch_success_renders_contact() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));

        load_detail(&mut app, contact("123", "a@b.com"));

        assert!(!app.is_busy());
        assert!(app.alert.is_none());
        match &app.detail_state {
            DetailState::Loaded(c) => {
                assert_eq!(c.full_name(), "A B");
                assert!(c.favorite);
            }
            other => panic!("expected Loaded, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_error_shows_request_failed() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        let request = Uuid::new_v4();
        app.menu_state = MenuState::Detail;
        app.detail_state = DetailState::Loading { request };

        app.handle_event(AppEvent::DetailFetched {
            request,
            result: Err("connection refused".to_string()),
        });

        assert!(!app.is_busy());
        assert_eq!(app.detail_state, DetailState::LoadFailed);
        assert_eq!(app.alert.as_deref(), Some("Request failed!"));
    }

    #[test]
    fn test_fetch_empty_shows_invalid_response() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        let request = Uuid::new_v4();
        app.menu_state = MenuState::Detail;
        app.detail_state = DetailState::Loading { request };

        app.handle_event(AppEvent::DetailFetched {
            request,
            result: Ok(None),
        });

        assert_eq!(app.detail_state, DetailState::LoadFailed);
        assert_eq!(app.alert.as_deref(), Some("Invalid Response!"));
    }

    #[test]
    fn test_stale_fetch_result_is_dropped() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        // A completion from a previous screen entry must not revive anything
        app.handle_event(AppEvent::DetailFetched {
            request: Uuid::new_v4(),
            result: Err("late failure".to_string()),
        });

        assert!(matches!(app.detail_state, DetailState::Loaded(_)));
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_call_without_number_alerts() {
        let (mut app, _rx, opened, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("", "a@b.com"));

        app.handle_event(key(KeyCode::Char('c')));

        assert_eq!(app.alert.as_deref(), Some("Phone number not available!"));
        assert!(opened.borrow().is_empty());
    }

    #[test]
    fn test_call_without_capability_alerts() {
        let (mut app, _rx, opened, _) = test_app(FakePlatform::new(false, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('c')));

        assert_eq!(app.alert.as_deref(), Some("Can't make phone call!"));
        assert!(opened.borrow().is_empty());
    }

    #[test]
    fn test_call_dispatches_tel_uri() {
        let (mut app, _rx, opened, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('c')));

        assert!(app.alert.is_none());
        assert_eq!(opened.borrow().as_slice(), ["tel:123"]);
    }

    #[test]
    fn test_text_without_capability_opens_no_composer() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, false, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('t')));

        assert_eq!(app.alert.as_deref(), Some("Can't send message!"));
        assert!(app.composer.is_none());
    }

    #[test]
    fn test_text_opens_prefilled_composer() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('t')));

        let composer = app.composer.as_ref().expect("composer should be open");
        assert_eq!(composer.kind, ComposerKind::Text);
        assert_eq!(composer.recipient, "123");
        assert_eq!(composer.body, "Message Body");
    }

    #[test]
    fn test_email_without_address_skips_capability_check() {
        let (mut app, _rx, _, mail_queries) = test_app(FakePlatform::new(true, true, false));
        load_detail(&mut app, contact("123", ""));

        app.handle_event(key(KeyCode::Char('m')));

        assert_eq!(app.alert.as_deref(), Some("Email not available!"));
        assert!(app.composer.is_none());
        assert_eq!(*mail_queries.borrow(), 0);
    }

    #[test]
    fn test_email_without_capability_alerts() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, false));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('m')));

        assert_eq!(app.alert.as_deref(), Some("Can't send Mail!"));
        assert!(app.composer.is_none());
    }

    #[test]
    fn test_email_opens_prefilled_composer() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('m')));

        let composer = app.composer.as_ref().expect("composer should be open");
        assert_eq!(composer.kind, ComposerKind::Mail);
        assert_eq!(composer.recipient, "a@b.com");
        assert_eq!(composer.subject, "E-mail...");
        assert_eq!(composer.body, "Hiiii");
    }

    #[test]
    fn test_composer_cancelled_alerts_and_dismisses() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.handle_event(key(KeyCode::Char('m')));

        app.handle_event(AppEvent::ComposerFinished {
            kind: ComposerKind::Mail,
            result: ComposerResult::Cancelled,
        });

        assert_eq!(app.alert.as_deref(), Some("Can't send Mail!"));
        assert!(app.composer.is_none());
    }

    #[test]
    fn test_composer_sent_dismisses_quietly() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.handle_event(key(KeyCode::Char('m')));

        app.handle_event(AppEvent::ComposerFinished {
            kind: ComposerKind::Mail,
            result: ComposerResult::Sent,
        });

        assert!(app.alert.is_none());
        assert!(app.composer.is_none());
    }

    #[test]
    fn test_text_composer_failure_message() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.handle_event(key(KeyCode::Char('t')));

        app.handle_event(AppEvent::ComposerFinished {
            kind: ComposerKind::Text,
            result: ComposerResult::Failed,
        });

        assert_eq!(app.alert.as_deref(), Some("Can't send Message!"));
        assert!(app.composer.is_none());
    }

    #[test]
    fn test_composer_escape_posts_cancelled() {
        let (mut app, mut rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.handle_event(key(KeyCode::Char('t')));

        app.handle_event(key(KeyCode::Esc));

        match rx.try_recv() {
            Ok(AppEvent::ComposerFinished { kind, result }) => {
                assert_eq!(kind, ComposerKind::Text);
                assert_eq!(result, ComposerResult::Cancelled);
            }
            other => panic!("expected ComposerFinished, got {:?}", other),
        }
    }

    #[test]
    fn test_show_alert_empty_is_noop() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));

        app.show_alert("");

        assert!(app.alert.is_none());
    }

    #[test]
    fn test_alert_swallows_keys_until_acknowledged() {
        let (mut app, _rx, opened, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.show_alert("Request failed!");

        // Action keys do nothing while the alert is up
        app.handle_event(key(KeyCode::Char('c')));
        assert!(opened.borrow().is_empty());
        assert!(app.alert.is_some());

        app.handle_event(key(KeyCode::Enter));
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_edit_save_posts_exactly_one_update() {
        let (mut app, mut rx, _, _) = test_app(FakePlatform::new(true, true, true));
        app.contacts = vec![contact("123", "a@b.com")];
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('e')));
        assert_eq!(app.menu_state, MenuState::EditContact);

        // Append to the first name field and save
        app.handle_event(key(KeyCode::Char('x')));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.menu_state, MenuState::Detail);

        let updated = match rx.try_recv() {
            Ok(AppEvent::ContactUpdated(c)) => c,
            other => panic!("expected ContactUpdated, got {:?}", other),
        };
        assert_eq!(updated.first_name, "Ax");
        assert!(matches!(rx.try_recv(), Err(_)), "save must post exactly once");

        // Applying the update refreshes both the screen and the list row
        app.handle_event(AppEvent::ContactUpdated(updated));
        match &app.detail_state {
            DetailState::Loaded(c) => assert_eq!(c.full_name(), "Ax B"),
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert_eq!(app.contacts[0].first_name, "Ax");
    }

    #[test]
    fn test_edit_cancel_posts_nothing() {
        let (mut app, mut rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Char('e')));
        app.handle_event(key(KeyCode::Char('x')));
        app.handle_event(key(KeyCode::Esc));

        assert_eq!(app.menu_state, MenuState::Detail);
        assert!(matches!(rx.try_recv(), Err(_)));
        match &app.detail_state {
            DetailState::Loaded(c) => assert_eq!(c.first_name, "A"),
            other => panic!("expected Loaded, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_requires_first_name() {
        let (mut app, mut rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.handle_event(key(KeyCode::Char('e')));

        app.handle_event(key(KeyCode::Backspace));
        app.handle_event(key(KeyCode::Enter));

        assert_eq!(app.menu_state, MenuState::EditContact);
        assert_eq!(app.status_message, "First name is required");
        assert!(matches!(rx.try_recv(), Err(_)));
    }

    #[test]
    fn test_favorite_toggle_in_edit_form() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));
        app.handle_event(key(KeyCode::Char('e')));

        app.edit_selected_field = 4;
        app.handle_event(key(KeyCode::Char(' ')));

        assert!(!app.edit_favorite);
    }

    #[test]
    fn test_leaving_detail_discards_contact() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        load_detail(&mut app, contact("123", "a@b.com"));

        app.handle_event(key(KeyCode::Esc));

        assert_eq!(app.menu_state, MenuState::Contacts);
        assert_eq!(app.detail_state, DetailState::Idle);
    }

    #[test]
    fn test_contacts_loaded_failure_sets_status() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));
        app.contacts_loading = true;

        app.handle_event(AppEvent::ContactsLoaded(Err("boom".to_string())));

        assert!(!app.contacts_loading);
        assert!(app.status_message.starts_with("Couldn't load contacts"));
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_avatar_bytes_land_in_cache() {
        let (mut app, _rx, _, _) = test_app(FakePlatform::new(true, true, true));

        app.handle_event(AppEvent::AvatarLoaded {
            url: "https://example.com/a.png".to_string(),
            result: Ok(vec![1, 2, 3]),
        });

        assert_eq!(
            app.avatar_cache.get("https://example.com/a.png"),
            Some(&vec![1, 2, 3])
        );
    }
}
