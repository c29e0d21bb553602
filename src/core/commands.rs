use crate::core::standings::split_contest_id;
use once_cell::sync::Lazy;
use regex::Regex;

const COMMANDS: [&'static str; 4] = ["!help", "!standings", "!ratings", "!contests"];
// All words, with optional "!" prefix
static REGEX_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\w+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Contest type prefix and contest number, validated when resolved.
    Standings(String, String),
    Ratings,
    Contests,
}

impl Command {
    /// `None` for anything that is not one of our commands.
    pub fn parse(input: &str) -> Option<Command> {
        let mut words = REGEX_WORDS.find_iter(input).map(|mat| mat.as_str());
        match words.next()? {
            cmd if cmd == COMMANDS[0] => Some(Command::Help),
            cmd if cmd == COMMANDS[1] => {
                // !standings abc 300, or !standings abc300
                let first = words.next().unwrap_or_default();
                let command = match words.next() {
                    Some(number) => Command::Standings(first.to_string(), number.to_string()),
                    None => Command::standings_for(first),
                };
                Some(command)
            }
            cmd if cmd == COMMANDS[2] => Some(Command::Ratings),
            cmd if cmd == COMMANDS[3] => Some(Command::Contests),
            _ => None,
        }
    }

    /// Standings request from a full contest id such as `abc300`.
    pub fn standings_for(contest_id: &str) -> Command {
        let (contest_type, contest_number) = split_contest_id(contest_id);
        Command::Standings(contest_type.to_string(), contest_number.to_string())
    }
}
