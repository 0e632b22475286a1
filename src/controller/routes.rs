use regex::{Captures, Regex};

use failure::Error as FailureError;

use models::{Coordinate, CylinderId};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Show,
    Quit,
    Locate,
    MapOpen,
    MapReady,
    MapClose,
    Tap(Coordinate),
    Confirm,
    Manual,
    Latitude(String),
    Longitude(String),
    Address(String),
    Note(String),
    Add(CylinderId),
    Increment(CylinderId),
    Decrement(CylinderId),
    Quantity(CylinderId, i64),
    Submit,
    ViewOrders,
    NewOrder,
}

pub type CommandBuilder = fn(&Captures) -> Option<Command>;

/// Ordered regex table; the first matching route wins.
#[derive(Default)]
pub struct CommandParser {
    routes: Vec<(Regex, CommandBuilder)>,
}

impl CommandParser {
    pub fn add_route(&mut self, pattern: &str, builder: CommandBuilder) -> Result<(), FailureError> {
        self.routes.push((Regex::new(pattern)?, builder));
        Ok(())
    }

    pub fn test(&self, line: &str) -> Option<Command> {
        let line = line.trim();
        self.routes
            .iter()
            .filter_map(|&(ref regex, builder)| regex.captures(line).map(|captures| (captures, builder)))
            .nth(0)
            .and_then(|(captures, builder)| builder(&captures))
    }
}

fn cylinder_id(captures: &Captures, index: usize) -> Option<CylinderId> {
    captures.get(index)?.as_str().parse().ok().map(CylinderId)
}

fn text(captures: &Captures, index: usize) -> String {
    captures.get(index).map(|m| m.as_str().to_string()).unwrap_or_default()
}

pub fn create_command_parser() -> Result<CommandParser, FailureError> {
    let mut router = CommandParser::default();

    router.add_route(r"^show$", |_| Some(Command::Show))?;
    router.add_route(r"^(quit|exit)$", |_| Some(Command::Quit))?;
    router.add_route(r"^locate$", |_| Some(Command::Locate))?;

    // Map picker
    router.add_route(r"^map open$", |_| Some(Command::MapOpen))?;
    router.add_route(r"^map ready$", |_| Some(Command::MapReady))?;
    router.add_route(r"^map close$", |_| Some(Command::MapClose))?;
    router.add_route(r"^tap\s+(\S+)\s+(\S+)$", |captures| {
        let latitude = captures.get(1)?.as_str().parse().ok()?;
        let longitude = captures.get(2)?.as_str().parse().ok()?;
        Some(Command::Tap(Coordinate::new(latitude, longitude)))
    })?;
    router.add_route(r"^confirm$", |_| Some(Command::Confirm))?;
    router.add_route(r"^manual$", |_| Some(Command::Manual))?;

    // Form fields, the rest of the line is the value
    router.add_route(r"^lat(?:\s+(.*))?$", |captures| Some(Command::Latitude(text(captures, 1))))?;
    router.add_route(r"^lng(?:\s+(.*))?$", |captures| Some(Command::Longitude(text(captures, 1))))?;
    router.add_route(r"^address(?:\s+(.*))?$", |captures| Some(Command::Address(text(captures, 1))))?;
    router.add_route(r"^note(?:\s+(.*))?$", |captures| Some(Command::Note(text(captures, 1))))?;

    // Cart
    router.add_route(r"^add\s+(\d+)$", |captures| cylinder_id(captures, 1).map(Command::Add))?;
    router.add_route(r"^inc\s+(\d+)$", |captures| cylinder_id(captures, 1).map(Command::Increment))?;
    router.add_route(r"^dec\s+(\d+)$", |captures| cylinder_id(captures, 1).map(Command::Decrement))?;
    router.add_route(r"^qty\s+(\d+)\s+(-?\d+)$", |captures| {
        let quantity = captures.get(2)?.as_str().parse().ok()?;
        cylinder_id(captures, 1).map(|id| Command::Quantity(id, quantity))
    })?;

    // Submission
    router.add_route(r"^submit$", |_| Some(Command::Submit))?;
    router.add_route(r"^orders$", |_| Some(Command::ViewOrders))?;
    router.add_route(r"^new$", |_| Some(Command::NewOrder))?;

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        let parser = create_command_parser().unwrap();

        assert_eq!(parser.test("  show "), Some(Command::Show));
        assert_eq!(parser.test("exit"), Some(Command::Quit));
        assert_eq!(parser.test("tap 0.35 32.58"), Some(Command::Tap(Coordinate::new(0.35, 32.58))));
        assert_eq!(parser.test("lat 1.0"), Some(Command::Latitude("1.0".to_string())));
        assert_eq!(parser.test("lat"), Some(Command::Latitude(String::new())));
        assert_eq!(
            parser.test("address Plot 4, Kampala Road"),
            Some(Command::Address("Plot 4, Kampala Road".to_string()))
        );
        assert_eq!(parser.test("add 12"), Some(Command::Add(CylinderId(12))));
        assert_eq!(parser.test("qty 6 -1"), Some(Command::Quantity(CylinderId(6), -1)));
        assert_eq!(parser.test("map open"), Some(Command::MapOpen));
    }

    #[test]
    fn rejects_malformed_commands() {
        let parser = create_command_parser().unwrap();

        assert_eq!(parser.test("tap north south"), None);
        assert_eq!(parser.test("add six"), None);
        assert_eq!(parser.test("launch"), None);
    }
}
