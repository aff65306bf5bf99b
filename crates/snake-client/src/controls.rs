use snake_core::input::Command;

use crate::session::SessionInput;

pub const HELP_TEXT: &str = "\
comandos: w/a/s/d ou up/down/left/right, p ou space (pausa), start, reset,
          login <usuário> <senha>, register <usuário> <senha>, logout, quit";

/// One line typed at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Input(SessionInput),
    Help,
}

/// Parse a typed line. Movement words become DOM-style key names so they go
/// through the same key routing as a browser would. Returns `None` for
/// anything unrecognized.
pub fn parse_control(line: &str) -> Option<Control> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        // Bare Enter toggles pause
        return Some(key(" "));
    };

    let control = match first.to_ascii_lowercase().as_str() {
        "w" | "up" => key("ArrowUp"),
        "s" | "down" => key("ArrowDown"),
        "a" | "left" => key("ArrowLeft"),
        "d" | "right" => key("ArrowRight"),
        "p" | "space" | "pause" => key(" "),
        "start" => Control::Input(SessionInput::Command(Command::Start)),
        "reset" => Control::Input(SessionInput::Command(Command::Reset)),
        "logout" => Control::Input(SessionInput::Logout),
        "quit" | "q" | "exit" => Control::Input(SessionInput::Quit),
        "help" | "?" => Control::Help,
        verb @ ("login" | "register") => {
            let username = words.next().unwrap_or_default().to_string();
            let password = words.next().unwrap_or_default().to_string();
            if verb == "login" {
                Control::Input(SessionInput::Login { username, password })
            } else {
                Control::Input(SessionInput::Register { username, password })
            }
        },
        _ => return None,
    };
    Some(control)
}

fn key(name: &str) -> Control {
    Control::Input(SessionInput::Key(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_words_map_to_arrow_keys() {
        assert_eq!(parse_control("w"), Some(key("ArrowUp")));
        assert_eq!(parse_control("DOWN"), Some(key("ArrowDown")));
        assert_eq!(parse_control(" a "), Some(key("ArrowLeft")));
        assert_eq!(parse_control("right"), Some(key("ArrowRight")));
    }

    #[test]
    fn pause_words_and_blank_line() {
        assert_eq!(parse_control("p"), Some(key(" ")));
        assert_eq!(parse_control("space"), Some(key(" ")));
        assert_eq!(parse_control(""), Some(key(" ")));
    }

    #[test]
    fn session_commands() {
        assert_eq!(
            parse_control("start"),
            Some(Control::Input(SessionInput::Command(Command::Start)))
        );
        assert_eq!(
            parse_control("quit"),
            Some(Control::Input(SessionInput::Quit))
        );
        assert_eq!(parse_control("help"), Some(Control::Help));
    }

    #[test]
    fn login_takes_credentials() {
        assert_eq!(
            parse_control("login ana s3cret"),
            Some(Control::Input(SessionInput::Login {
                username: "ana".into(),
                password: "s3cret".into()
            }))
        );
        // Missing password is left for the client to reject
        assert_eq!(
            parse_control("register ana"),
            Some(Control::Input(SessionInput::Register {
                username: "ana".into(),
                password: String::new()
            }))
        );
    }

    #[test]
    fn unknown_words_ignored() {
        assert_eq!(parse_control("jump"), None);
    }
}
