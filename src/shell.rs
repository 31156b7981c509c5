//! Line-oriented shell
//!
//! Reads one command per line, runs the matching page action and prints
//! the screen afterwards.

use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::app::App;
use crate::router::PageResult;

pub const HELP: &str = "\
Commands:
  go <path>                           route to /login, /signup, /dashboard or /workspace
  login <email> <password>            sign in
  signup <email> <password> <confirm> create an account
  logout                              sign out
  new-workspace <name>                create a workspace and open it
  open <workspace id>                 open a workspace
  back                                return to the workspace list
  leave                               leave the open workspace
  note <content>                      add a note (\\n starts a new line)
  edit <note id> <content>            replace a note's content
  delete <note id>                    delete a note
  refresh                             reload notes
  show                                print the screen
  help                                print this help
  quit                                exit";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Login { email: String, password: String },
    Signup { email: String, password: String, confirm: String },
    Logout,
    NewWorkspace(String),
    Open(String),
    Back,
    Leave,
    Note(String),
    Edit { note_id: String, content: String },
    Delete(String),
    Refresh,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Multi-line note content typed on a single line
fn unescape(content: &str) -> String {
    content.replace("\\n", "\n")
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name {
            "" => return Err(ParseError::Empty),
            "go" => match args.as_slice() {
                [path] => Command::Go(path.to_string()),
                _ => return Err(ParseError::Usage("go <path>")),
            },
            "login" => match args.as_slice() {
                [email, password] => Command::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(ParseError::Usage("login <email> <password>")),
            },
            "signup" => match args.as_slice() {
                [email, password, confirm] => Command::Signup {
                    email: email.to_string(),
                    password: password.to_string(),
                    confirm: confirm.to_string(),
                },
                _ => return Err(ParseError::Usage("signup <email> <password> <confirm>")),
            },
            "logout" => Command::Logout,
            "new-workspace" => Command::NewWorkspace(rest.to_string()),
            "open" => match args.as_slice() {
                [id] => Command::Open(id.to_string()),
                _ => return Err(ParseError::Usage("open <workspace id>")),
            },
            "back" => Command::Back,
            "leave" => Command::Leave,
            "note" => Command::Note(unescape(rest)),
            "edit" => match rest.split_once(char::is_whitespace) {
                Some((id, content)) => Command::Edit {
                    note_id: id.to_string(),
                    content: unescape(content.trim()),
                },
                None if !rest.is_empty() => Command::Edit {
                    note_id: rest.to_string(),
                    content: String::new(),
                },
                None => return Err(ParseError::Usage("edit <note id> <content>")),
            },
            "delete" => match args.as_slice() {
                [id] => Command::Delete(id.to_string()),
                _ => return Err(ParseError::Usage("delete <note id>")),
            },
            "refresh" => Command::Refresh,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Render,
    Help,
    Quit,
}

/// Run one command against the app
pub async fn execute(app: &App, command: Command) -> Flow {
    let router = &app.router;
    let result: PageResult<()> = match command {
        Command::Go(path) => {
            router.navigate(&path).await;
            Ok(())
        }
        Command::Login { email, password } => app.login.submit(router, &email, &password).await,
        Command::Signup {
            email,
            password,
            confirm,
        } => {
            app.signup
                .submit(router, &email, &password, &confirm)
                .await
        }
        Command::Logout => app.dashboard.sign_out(router).await,
        Command::NewWorkspace(name) => app.dashboard.create_workspace(router, &name).await,
        Command::Open(id) => app.dashboard.open_workspace(router, &id).await,
        Command::Back => app.workspace.back(router).await,
        Command::Leave => app.workspace.leave(router).await,
        Command::Note(content) => app.workspace.notes().create(router, &content).await,
        Command::Edit { note_id, content } => {
            app.workspace
                .notes()
                .update(router, &note_id, &content)
                .await
        }
        Command::Delete(id) => app.workspace.notes().delete(router, &id).await,
        Command::Refresh => app.workspace.notes().refresh(router).await,
        Command::Show => Ok(()),
        Command::Help => return Flow::Help,
        Command::Quit => return Flow::Quit,
    };

    if let Err(error) = result {
        tracing::debug!(error = %error, "Action failed");
        router.recover(error).await;
    }
    Flow::Render
}

/// Read commands from `input` until EOF or `quit`
pub async fn run<R, W>(app: &App, input: R, output: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write_screen(app, output)?;

    let mut lines = input.lines();
    loop {
        write!(output, "{}> ", app.router.current_path())?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        match execute(app, command).await {
            Flow::Render => write_screen(app, output)?,
            Flow::Help => writeln!(output, "{}", HELP)?,
            Flow::Quit => break,
        }
    }
    Ok(())
}

fn write_screen<W: Write>(app: &App, output: &mut W) -> std::io::Result<()> {
    writeln!(output)?;
    write!(output, "{}", app.router.mount().render_text())?;
    writeln!(output)
}
