use battleships::{Command, CommandError};

#[test]
fn test_parse_commands() {
    assert_eq!("play".parse::<Command>().unwrap(), Command::Play);
    assert_eq!("PLAY".parse::<Command>().unwrap(), Command::Play);
    assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
    assert_eq!("help".parse::<Command>().unwrap(), Command::Help);
    assert_eq!("board".parse::<Command>().unwrap(), Command::Board);
    assert_eq!(
        "fire B3".parse::<Command>().unwrap(),
        Command::Fire("B3".to_string())
    );
    assert_eq!(
        "Fire   j10  ".parse::<Command>().unwrap(),
        Command::Fire("j10".to_string())
    );
}

#[test]
fn test_fire_target_is_passed_through_unvalidated() {
    // The board validates references; the parser only splits the line.
    assert_eq!(
        "fire Z99".parse::<Command>().unwrap(),
        Command::Fire("Z99".to_string())
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        "fire".parse::<Command>().unwrap_err(),
        CommandError::FireUsage
    );
    assert_eq!(
        "fire B3 junk".parse::<Command>().unwrap_err(),
        CommandError::FireUsage
    );
    assert_eq!(
        "fire B3 C4".parse::<Command>().unwrap_err(),
        CommandError::FireUsage
    );
    assert_eq!(
        "dance now".parse::<Command>().unwrap_err(),
        CommandError::Unknown("dance now".to_string())
    );
    assert_eq!(
        "".parse::<Command>().unwrap_err(),
        CommandError::Unknown(String::new())
    );
}
