//! Shell command grammar.

use thiserror::Error;

use stockroom_core::ItemId;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Login { username: String, password: String },
    Logout,
    List,
    Search(String),
    Add { name: String, quantity: f64, price: f64 },
    Edit(ItemId),
    Set(DraftField, String),
    Save,
    Cancel,
    Delete(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Quantity,
    Price,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{value}' is not a valid {what}")]
    InvalidNumber { what: &'static str, value: String },
}

pub const HELP: &str = "\
commands:
  login <user> <password>            open the inventory
  list                               show items matching the current search
  search [term]                      filter by name (no term clears)
  add <name...> <quantity> <price>   add an item, or top up one with the same name
  edit <id>                          start editing an item
  set name|quantity|price [value]    change the edit draft (no value clears it)
  save | cancel                      finish the edit
  delete <id>                        remove an item (asks first)
  logout                             close the session (asks first)
  help | quit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "login" => match args.as_slice() {
                [username, password] => Ok(Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                _ => Err(ParseError::Usage("login <user> <password>")),
            },
            "logout" => Ok(Command::Logout),
            "list" | "ls" => Ok(Command::List),
            "search" | "find" => Ok(Command::Search(rest.to_string())),
            "add" => parse_add(&args),
            "edit" => single_id(&args, "edit <id>").map(Command::Edit),
            "delete" | "rm" => single_id(&args, "delete <id>").map(Command::Delete),
            "set" => parse_set(rest),
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }

    /// Commands accepted before login.
    pub fn is_public(&self) -> bool {
        matches!(self, Command::Help | Command::Quit | Command::Login { .. })
    }
}

fn parse_add(args: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "add <name...> <quantity> <price>";
    let [name @ .., quantity, price] = args else {
        return Err(ParseError::Usage(USAGE));
    };
    if name.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    Ok(Command::Add {
        name: name.join(" "),
        quantity: parse_quantity(quantity)?,
        price: parse_price(price)?,
    })
}

fn parse_set(rest: &str) -> Result<Command, ParseError> {
    const USAGE: &str = "set name|quantity|price [value]";
    let (field, value) = match rest.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (rest, ""),
    };
    let field = match field.to_ascii_lowercase().as_str() {
        "name" => DraftField::Name,
        "quantity" | "qty" => DraftField::Quantity,
        "price" => DraftField::Price,
        _ => return Err(ParseError::Usage(USAGE)),
    };
    Ok(Command::Set(field, value.to_string()))
}

fn single_id(args: &[&str], usage: &'static str) -> Result<ItemId, ParseError> {
    match args {
        [raw] => raw.parse().map_err(|_| ParseError::InvalidNumber {
            what: "item id",
            value: raw.to_string(),
        }),
        _ => Err(ParseError::Usage(usage)),
    }
}

pub(crate) fn parse_quantity(raw: &str) -> Result<f64, ParseError> {
    parse_finite(raw, "quantity")
}

pub(crate) fn parse_price(raw: &str) -> Result<f64, ParseError> {
    parse_finite(raw, "price")
}

fn parse_finite(raw: &str, what: &'static str) -> Result<f64, ParseError> {
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ParseError::InvalidNumber {
            what,
            value: raw.to_string(),
        }),
    }
}
