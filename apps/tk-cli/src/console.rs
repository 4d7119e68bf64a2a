//! Stdin console standing in for the telemetry feed, the operator endpoint
//! and actuator status frames.

use serde_json::{Value, json};
use tk_app::{AppResult, ControlUnit};

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Level(String),
    Status,
    History,
    Mode(String),
    Valve(i64),
    Report(String),
    Help,
    Quit,
}

pub const HELP: &str = "commands: level <cm> | <cm> | status | history | mode <automatic|manual> | valve <0-100> | report <json> | help | quit";

/// Parse one console line; `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "level" => ConsoleCommand::Level(require(rest, "level")?.to_string()),
        "status" => ConsoleCommand::Status,
        "history" => ConsoleCommand::History,
        "mode" => ConsoleCommand::Mode(require(rest, "mode")?.to_string()),
        "valve" => {
            let value = require(rest, "valve")?;
            ConsoleCommand::Valve(
                value
                    .parse()
                    .map_err(|_| format!("valve expects an integer, got {value:?}"))?,
            )
        }
        "report" => ConsoleCommand::Report(require(rest, "report")?.to_string()),
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        _ if word.parse::<f64>().is_ok() && rest.is_empty() => {
            ConsoleCommand::Level(word.to_string())
        }
        _ => return Err(format!("unknown command {word:?}")),
    };
    Ok(Some(command))
}

fn require<'a>(arg: &'a str, command: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("{command} needs an argument"))
    } else {
        Ok(arg)
    }
}

/// Run a command against the unit and build the JSON reply.
pub fn execute(unit: &ControlUnit, command: ConsoleCommand) -> AppResult<Value> {
    let reply = match command {
        ConsoleCommand::Level(payload) => {
            let reading = unit.ingress().handle_payload(&payload)?;
            serde_json::to_value(reading)?
        }
        ConsoleCommand::Status => serde_json::to_value(unit.operator().status())?,
        ConsoleCommand::History => serde_json::to_value(unit.operator().history())?,
        ConsoleCommand::Mode(name) => {
            unit.operator().request_mode_named(&name)?;
            json!({ "success": true, "mode": unit.state().mode() })
        }
        ConsoleCommand::Valve(opening) => {
            let opening = unit.operator().set_valve(opening)?;
            json!({ "success": true, "opening": opening })
        }
        ConsoleCommand::Report(frame) => {
            serde_json::to_value(unit.reports().handle_frame(&frame)?)?
        }
        ConsoleCommand::Help => json!({ "help": HELP }),
        ConsoleCommand::Quit => json!({ "bye": true }),
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(
            parse("level 12.5").unwrap(),
            Some(ConsoleCommand::Level("12.5".to_string()))
        );
        assert_eq!(
            parse("33").unwrap(),
            Some(ConsoleCommand::Level("33".to_string()))
        );
        assert_eq!(parse("STATUS").unwrap(), Some(ConsoleCommand::Status));
        assert_eq!(
            parse("mode manual").unwrap(),
            Some(ConsoleCommand::Mode("manual".to_string()))
        );
        assert_eq!(parse("valve 75").unwrap(), Some(ConsoleCommand::Valve(75)));
        assert_eq!(
            parse(r#"report {"valve": 20}"#).unwrap(),
            Some(ConsoleCommand::Report(r#"{"valve": 20}"#.to_string()))
        );
        assert_eq!(parse("quit").unwrap(), Some(ConsoleCommand::Quit));
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(parse("valve").is_err());
        assert!(parse("valve half").is_err());
        assert!(parse("mode").is_err());
        assert!(parse("drain now").is_err());
    }
}
