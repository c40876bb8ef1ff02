// Interactive shell - line editing, meta-commands and SQL dispatch

mod commands;

pub use commands::{parse_meta_command, MetaCommand};

use crate::executor::Executor;
use crate::parser::parse_statement;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

pub const PROMPT: &str = "tate> ";

const BANNER: &str = r"
  _____      _
 |_   _|__ _| |_ ___
   | |/ _' | __/ _ \
   | | (_| | ||  __/
   |_|\__,_|\__\___|

Tate - A minimal columnar database
";

const HELP: &str = r"
Available Commands:
  help, \h           - Show this help message
  exit, \q           - Exit the program
  tables, \dt        - List all tables
  describe <table>   - Show table schema (also \d <table>)
  clear, \c          - Clear the screen

SQL Commands:
  CREATE TABLE table_name (col1 TYPE [NOT NULL], col2 TYPE, ...)
  DROP TABLE [IF EXISTS] table_name
  INSERT INTO table_name [(col1, col2)] VALUES (val1, val2)
  SELECT [DISTINCT] cols FROM table_name [WHERE expr]
         [ORDER BY col [ASC|DESC], ...] [LIMIT n] [OFFSET n]
  Aggregates: COUNT(*), COUNT([DISTINCT] col), SUM, AVG, MIN, MAX

Supported Data Types:
  INT64      - 64-bit integer
  FLOAT64    - 64-bit floating point
  STRING     - Variable-length string
  BOOL       - Boolean (TRUE/FALSE)
  TIMESTAMP  - Date and time ('YYYY-MM-DD HH:MM:SS')
";

/// What the loop should do after a line has been handled.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    Output(String),
    Exit,
}

pub struct Shell {
    executor: Executor,
    data_dir: PathBuf,
    history_file: Option<PathBuf>,
}

impl Shell {
    #[must_use]
    pub const fn new(executor: Executor, data_dir: PathBuf, history_file: Option<PathBuf>) -> Self {
        Self {
            executor,
            data_dir,
            history_file,
        }
    }

    /// Reads lines until EOF, Ctrl-D or an exit command.
    pub fn run(&self) -> Result<(), ReadlineError> {
        let mut rl = DefaultEditor::new()?;
        if let Some(ref path) = self.history_file {
            // missing history on first start is expected
            let _ = rl.load_history(path);
        }

        print!("{BANNER}");
        println!("Data directory: {}", self.data_dir.display());
        println!("Type 'help' for available commands, 'exit' to quit.\n");

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    match self.handle_line(line) {
                        LineOutcome::Output(text) => print!("{text}"),
                        LineOutcome::Exit => {
                            println!("Bye!");
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(ref path) = self.history_file {
            if let Err(e) = rl.save_history(path) {
                warn!(path = %path.display(), error = %e, "could not save history");
            }
        }
        Ok(())
    }

    /// Handles one non-empty input line and returns the text to print.
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let text = match parse_meta_command(line) {
            Some(MetaCommand::Exit) => return LineOutcome::Exit,
            Some(MetaCommand::Help) => format!("{HELP}\n"),
            Some(MetaCommand::ListTables) => self.list_tables(),
            Some(MetaCommand::Describe(name)) => self.describe_table(&name),
            Some(MetaCommand::Clear) => "\x1b[H\x1b[2J".to_string(),
            None => self.execute_sql(line),
        };
        LineOutcome::Output(text)
    }

    fn list_tables(&self) -> String {
        let catalog = self.executor.catalog();
        let tables = catalog.list_tables();
        if tables.is_empty() {
            return "No tables found.\n".to_string();
        }

        let mut out = String::from("Tables:\n--------\n");
        for name in tables {
            match catalog.get_table(&name) {
                Some(schema) => {
                    let _ = writeln!(out, "  {name} ({} columns)", schema.columns.len());
                }
                None => {
                    let _ = writeln!(out, "  {name}");
                }
            }
        }
        out.push('\n');
        out
    }

    fn describe_table(&self, name: &str) -> String {
        let Some(schema) = self.executor.catalog().get_table(name) else {
            return format!("Table '{name}' not found.\n");
        };

        let rule = "-".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "\nTable: {}", schema.name);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:<20} {:<15} Properties", "Column", "Type");
        let _ = writeln!(out, "{rule}");
        for col in &schema.columns {
            let props = if col.nullable { "" } else { "NOT NULL" };
            let _ = writeln!(out, "{:<20} {:<15} {props}", col.name, col.data_type.to_string());
        }
        out.push('\n');
        out
    }

    fn execute_sql(&self, sql: &str) -> String {
        let start = Instant::now();

        let stmt = match parse_statement(sql) {
            Ok(stmt) => stmt,
            Err(errors) => {
                let mut out = String::from("Parse error:\n");
                for err in errors {
                    let _ = writeln!(out, "  {err}");
                }
                return out;
            }
        };

        let result = match self.executor.execute(stmt) {
            Ok(result) => result,
            Err(e) => return format!("Execution error: {e}\n"),
        };
        let elapsed = start.elapsed();

        let mut out = String::new();
        if let Some(ref message) = result.message {
            let _ = writeln!(out, "{message}");
        }
        if !result.columns.is_empty() {
            let _ = writeln!(out, "{}", result.render());
        }
        let _ = writeln!(
            out,
            "({} row(s) in {:.3} ms)\n",
            result.row_count(),
            elapsed.as_secs_f64() * 1000.0
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Catalog;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn shell() -> (TempDir, Shell) {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Arc::new(Catalog::open(temp_dir.path()).unwrap());
        let executor = Executor::new(catalog, temp_dir.path());
        let shell = Shell::new(executor, temp_dir.path().to_path_buf(), None);
        (temp_dir, shell)
    }

    fn output(shell: &Shell, line: &str) -> String {
        match shell.handle_line(line) {
            LineOutcome::Output(text) => text,
            LineOutcome::Exit => panic!("unexpected exit on {line}"),
        }
    }

    #[test]
    fn test_exit() {
        let (_dir, shell) = shell();
        assert_eq!(shell.handle_line("\\q"), LineOutcome::Exit);
    }

    #[test]
    fn test_sql_round_trip_through_shell() {
        let (_dir, shell) = shell();
        let out = output(&shell, "CREATE TABLE t (id INT64 NOT NULL, name STRING);");
        assert!(out.starts_with("Table 't' created successfully\n"));
        assert!(out.contains("(0 row(s) in "));

        output(&shell, "INSERT INTO t VALUES (1, 'Alice')");
        let out = output(&shell, "SELECT * FROM t");
        assert!(out.contains("Alice"));
        assert!(out.contains("(1 row(s) in "));
    }

    #[test]
    fn test_errors_are_reported() {
        let (_dir, shell) = shell();
        let out = output(&shell, "SELEC * FROM t");
        assert!(out.starts_with("Parse error:\n  line 1: "));

        let out = output(&shell, "SELECT * FROM ghost");
        assert_eq!(out, "Execution error: table 'ghost' does not exist\n");
    }

    #[test]
    fn test_tables_and_describe() {
        let (_dir, shell) = shell();
        assert_eq!(output(&shell, "tables"), "No tables found.\n");

        output(&shell, "CREATE TABLE t (id INT64 NOT NULL, name STRING)");
        assert!(output(&shell, "\\dt").contains("  t (2 columns)"));

        let out = output(&shell, "describe t");
        assert!(out.contains("Table: t"));
        assert!(out.contains("INT64"));
        assert!(out.contains("NOT NULL"));
        assert_eq!(output(&shell, "\\d nope"), "Table 'nope' not found.\n");
    }
}
