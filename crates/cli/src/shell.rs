//! Interactive shell over the login gate and the inventory store.

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use stockroom_auth::{AuthError, CredentialPolicy, LogoutOutcome, SessionGate};
use stockroom_core::ItemId;
use stockroom_inventory::{
    DeleteOutcome, EditOutcome, InventoryError, InventoryStore, Item, ItemDraft, Valuation,
};
use stockroom_storage::KeyValueStore;

use crate::command::{self, Command, DraftField, HELP, ParseError};
use crate::console::Console;

/// Whether the read loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

type Notify<R, W> = Rc<Console<R, W>>;

pub struct Shell<S, R, W> {
    console: Rc<Console<R, W>>,
    gate: SessionGate<S, Notify<R, W>>,
    inventory: InventoryStore<S, Notify<R, W>>,
}

impl<S, R, W> Shell<S, R, W>
where
    S: KeyValueStore + Clone,
    R: BufRead,
    W: Write,
{
    /// Load the inventory and start logged out.
    pub fn new(
        storage: S,
        policy: CredentialPolicy,
        console: Rc<Console<R, W>>,
    ) -> Result<Self, InventoryError> {
        let inventory = InventoryStore::open(storage.clone(), Rc::clone(&console))?;
        let gate = SessionGate::new(storage, Rc::clone(&console), policy);
        Ok(Self {
            console,
            gate,
            inventory,
        })
    }

    pub fn inventory(&self) -> &InventoryStore<S, Notify<R, W>> {
        &self.inventory
    }

    pub fn gate(&self) -> &SessionGate<S, Notify<R, W>> {
        &self.gate
    }

    /// Read and execute commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        self.console
            .println("stockroom: log in with 'login <user> <password>' ('help' for commands)")?;
        loop {
            let prompt = if self.gate.is_logged_in() { "stockroom> " } else { "login> " };
            self.console.print(prompt)?;

            let Some(line) = self.console.read_line()? else {
                self.console.println("")?;
                return Ok(());
            };
            if self.execute(&line)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Execute one input line. Only terminal write failures are errors;
    /// everything else is reported on the console.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(ParseError::Empty) => return Ok(Flow::Continue),
            Err(err) => {
                self.console.println(&format!("error: {err}"))?;
                return Ok(Flow::Continue);
            }
        };

        if !command.is_public() && !self.gate.is_logged_in() {
            self.console
                .println("please log in first: login <user> <password>")?;
            return Ok(Flow::Continue);
        }

        match command {
            Command::Help => self.console.println(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Login { username, password } => self.login(&username, &password)?,
            Command::Logout => self.logout()?,
            Command::List => self.list()?,
            Command::Search(term) => {
                self.inventory.set_search(term);
                self.list()?;
            }
            Command::Add {
                name,
                quantity,
                price,
            } => {
                let mut draft = ItemDraft::new(name, quantity, price);
                let result = self.inventory.add_item(&mut draft);
                self.report(result.map(|_| ()))?;
            }
            Command::Edit(id) => self.start_edit(id)?,
            Command::Set(field, value) => self.set_field(field, &value)?,
            Command::Save => match self.inventory.save_edit() {
                Ok(EditOutcome::Updated(_)) | Ok(EditOutcome::TargetMissing(_)) => {}
                Err(err) => self.report_error(&err)?,
            },
            Command::Cancel => {
                if self.inventory.editing().is_some() {
                    self.inventory.cancel_edit();
                    self.console.println("edit cancelled")?;
                } else {
                    self.console.println("nothing to cancel")?;
                }
            }
            Command::Delete(id) => match self.inventory.request_delete(id) {
                Ok(DeleteOutcome::Deleted(_)) => {}
                Ok(DeleteOutcome::Cancelled) => self.console.println("delete cancelled")?,
                Err(err) => self.report_error(&err)?,
            },
        }
        Ok(Flow::Continue)
    }

    fn login(&mut self, username: &str, password: &str) -> io::Result<()> {
        match self.gate.login(username, password) {
            Ok(_) => self.list(),
            Err(AuthError::InvalidCredentials) => {
                self.console.println("Invalid username or password.")
            }
            Err(err) => {
                tracing::error!(error = %err, "login failed");
                self.console.println(&format!("error: {err}"))
            }
        }
    }

    fn logout(&mut self) -> io::Result<()> {
        match self.gate.logout() {
            Ok(LogoutOutcome::LoggedOut(_)) => {
                self.inventory.cancel_edit();
                self.inventory.set_search("");
                Ok(())
            }
            Ok(LogoutOutcome::Cancelled) => self.console.println("logout cancelled"),
            Err(err) => self.console.println(&format!("error: {err}")),
        }
    }

    fn list(&self) -> io::Result<()> {
        let visible = self.inventory.visible();
        if !self.inventory.search_term().is_empty() {
            self.console.println(&format!(
                "search: '{}' ({} of {} items)",
                self.inventory.search_term(),
                visible.len(),
                self.inventory.items().len()
            ))?;
        }
        if visible.is_empty() {
            return self.console.println("(no items)");
        }

        self.console
            .println(&format!("{:>4}  {:<24} {:>8} {:>10}", "ID", "NAME", "QTY", "PRICE"))?;
        for item in &visible {
            self.console.println(&format_row(item))?;
        }

        let totals = Valuation::of(visible.iter().copied());
        self.console.println(&format!(
            "total: {} item(s), {} unit(s), value {:.2}",
            totals.lines, totals.units, totals.total_value
        ))
    }

    fn start_edit(&mut self, id: ItemId) -> io::Result<()> {
        match self.inventory.start_edit(id).map(|_| ()) {
            Ok(()) => self.show_draft(),
            Err(err) => self.report_error(&err),
        }
    }

    fn set_field(&mut self, field: DraftField, value: &str) -> io::Result<()> {
        let Some(draft) = self.inventory.edit_draft_mut() else {
            return self.console.println("no edit in progress: edit <id>");
        };

        let parsed = match field {
            DraftField::Name => {
                draft.name = value.to_string();
                Ok(())
            }
            DraftField::Quantity if value.is_empty() => {
                draft.quantity = None;
                Ok(())
            }
            DraftField::Quantity => command::parse_quantity(value).map(|q| draft.quantity = Some(q)),
            DraftField::Price if value.is_empty() => {
                draft.price = None;
                Ok(())
            }
            DraftField::Price => command::parse_price(value).map(|p| draft.price = Some(p)),
        };

        match parsed {
            Ok(()) => self.show_draft(),
            Err(err) => self.console.println(&format!("error: {err}")),
        }
    }

    fn show_draft(&self) -> io::Result<()> {
        let Some(edit) = self.inventory.editing() else {
            return Ok(());
        };
        let draft = &edit.draft;
        self.console.println(&format!(
            "editing #{}: name={:?} quantity={} price={} (save | cancel)",
            edit.item_id,
            draft.name,
            draft.quantity.map_or_else(|| "-".to_string(), |q| q.to_string()),
            draft.price.map_or_else(|| "-".to_string(), |p| p.to_string()),
        ))
    }

    fn report(&self, result: Result<(), InventoryError>) -> io::Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(err) => self.report_error(&err),
        }
    }

    fn report_error(&self, err: &InventoryError) -> io::Result<()> {
        if !err.is_validation() {
            tracing::error!(error = %err, "inventory operation failed");
        }
        self.console.println(&format!("error: {err}"))
    }
}

fn format_row(item: &Item) -> String {
    format!(
        "{:>4}  {:<24} {:>8} {:>10.2}",
        item.id, item.name, item.quantity, item.price
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use stockroom_storage::InMemoryStore;

    use super::*;

    type TestShell = Shell<Rc<InMemoryStore>, Cursor<Vec<u8>>, Vec<u8>>;

    fn shell_with_input(storage: Rc<InMemoryStore>, input: &str) -> (TestShell, Rc<Console<Cursor<Vec<u8>>, Vec<u8>>>) {
        let console = Rc::new(Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new()));
        let shell = Shell::new(storage, CredentialPolicy::default(), Rc::clone(&console)).unwrap();
        (shell, console)
    }

    fn output(console: &Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        console.with_output(|w| String::from_utf8_lossy(w).into_owned())
    }

    fn logged_in(input: &str) -> (TestShell, Rc<Console<Cursor<Vec<u8>>, Vec<u8>>>) {
        let (mut shell, console) = shell_with_input(Rc::new(InMemoryStore::new()), input);
        shell.execute("login admin admin123").unwrap();
        (shell, console)
    }

    #[test]
    fn inventory_commands_need_login() {
        let (mut shell, console) = shell_with_input(Rc::new(InMemoryStore::new()), "");
        shell.execute("add Widget 10 2.5").unwrap();

        assert!(shell.inventory().items().is_empty());
        assert!(output(&console).contains("please log in first"));
    }

    #[test]
    fn wrong_password_is_reported() {
        let (mut shell, console) = shell_with_input(Rc::new(InMemoryStore::new()), "");
        shell.execute("login admin wrong").unwrap();

        assert!(!shell.gate().is_logged_in());
        assert!(shell.gate().login_error());
        assert!(output(&console).contains("Invalid username or password."));
    }

    #[test]
    fn add_merge_and_list() {
        let (mut shell, console) = logged_in("");
        shell.execute("add Widget 10 2.5").unwrap();
        shell.execute("add widget 5 3").unwrap();
        shell.execute("list").unwrap();

        let items = shell.inventory().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 15.0);
        assert_eq!(items[0].price, 3.0);

        let out = output(&console);
        assert!(out.contains("[success] Login Successful"));
        assert!(out.contains("[success] The item has been added to the inventory."));
        assert!(out.contains("[warning] Existing item updated"));
        assert!(out.contains("total: 1 item(s), 15 unit(s), value 45.00"));
    }

    #[test]
    fn fractional_quantities_are_listed_as_entered() {
        let (mut shell, console) = logged_in("");
        shell.execute("add Flour 2.5 1.2").unwrap();
        shell.execute("add flour 0.5 1").unwrap();
        shell.execute("list").unwrap();

        assert_eq!(shell.inventory().items()[0].quantity, 3.0);
        let out = output(&console);
        assert!(out.contains("   1  Flour                           3       1.00"));
        assert!(out.contains("total: 1 item(s), 3 unit(s), value 3.00"));
    }

    #[test]
    fn delete_reads_confirmation_from_input() {
        let (mut shell, console) = logged_in("n\ny\n");
        shell.execute("add Widget 1 1").unwrap();

        shell.execute("delete 1").unwrap();
        assert_eq!(shell.inventory().items().len(), 1);
        assert!(output(&console).contains("delete cancelled"));

        shell.execute("delete 1").unwrap();
        assert!(shell.inventory().items().is_empty());
        assert!(output(&console).contains("[danger] Item deleted"));
    }

    #[test]
    fn edit_flow_updates_the_item() {
        let (mut shell, console) = logged_in("");
        shell.execute("add Widget 10 2.5").unwrap();
        shell.execute("edit 1").unwrap();
        shell.execute("set name Blue Widget").unwrap();
        shell.execute("set price 4").unwrap();
        shell.execute("save").unwrap();

        let item = &shell.inventory().items()[0];
        assert_eq!(item.name, "Blue Widget");
        assert_eq!(item.price, 4.0);
        assert_eq!(item.quantity, 10.0);
        assert!(output(&console).contains("[success] Item updated"));
    }

    #[test]
    fn saving_an_incomplete_draft_reports_validation() {
        let (mut shell, console) = logged_in("");
        shell.execute("add Widget 10 2.5").unwrap();
        shell.execute("edit 1").unwrap();
        shell.execute("set quantity").unwrap();
        shell.execute("save").unwrap();

        assert!(output(&console).contains("error: validation failed: quantity is required"));
        assert!(shell.inventory().editing().is_some());
        assert_eq!(shell.inventory().items()[0].quantity, 10.0);
    }

    #[test]
    fn set_without_edit_is_explained() {
        let (mut shell, console) = logged_in("");
        shell.execute("set name X").unwrap();
        assert!(output(&console).contains("no edit in progress"));
    }

    #[test]
    fn search_filters_the_listing() {
        let (mut shell, console) = logged_in("");
        shell.execute("add Widget 10 2.5").unwrap();
        shell.execute("add Gadget 2 9.99").unwrap();
        shell.execute("search gad").unwrap();

        let out = output(&console);
        assert!(out.contains("search: 'gad' (1 of 2 items)"));
        assert!(out.contains("Gadget"));
        assert_eq!(shell.inventory().search_term(), "gad");
    }

    #[test]
    fn logout_after_confirmation_closes_the_gate() {
        let (mut shell, console) = logged_in("yes\n");
        shell.execute("logout").unwrap();

        assert!(!shell.gate().is_logged_in());
        assert!(output(&console).contains("[warning] Logged out"));
    }

    #[test]
    fn run_stops_at_quit() {
        let storage = Rc::new(InMemoryStore::new());
        let (mut shell, console) = shell_with_input(
            Rc::clone(&storage),
            "login admin admin123\nadd Widget 10 2.5\nquit\nadd Gadget 1 1\n",
        );
        shell.run().unwrap();

        assert_eq!(shell.inventory().items().len(), 1);
        assert!(output(&console).contains("stockroom> "));
        assert!(storage.get("inventory").unwrap().is_some());
    }

    #[test]
    fn parse_errors_do_not_stop_the_shell() {
        let (mut shell, console) = logged_in("");
        assert_eq!(shell.execute("add Widget ten 1").unwrap(), Flow::Continue);
        assert_eq!(shell.execute("bogus").unwrap(), Flow::Continue);
        let out = output(&console);
        assert!(out.contains("error: 'ten' is not a valid quantity"));
        assert!(out.contains("unknown command 'bogus'"));
    }
}
