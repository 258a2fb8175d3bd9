use anyhow::{bail, Context, Result};
use candidates_client::{Config, ListSession, SafeStorage, PAGE_SIZE_KEY};
use candidates_core::NameFilter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::render;

const HELP: &str = "\
commands:
  next | prev             move one page
  goto <page>             jump to a visited page (1-based)
  size <n>                change the page size
  search [term]           search first/last name (debounced)
  status [s1 s2 ...]      keep only these statuses
  name [first] [last]     server-side name filter; `-` leaves a part blank
  retry                   re-run the last fetch
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    Goto(usize),
    Size(usize),
    Search(String),
    Status(Vec<String>),
    Name(NameFilter),
    Retry,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Option<Action>, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let number = |what: &str| {
        rest.parse::<usize>()
            .map_err(|_| format!("{what} expects a number, got {rest:?}"))
    };
    let action = match word {
        "" => return Ok(None),
        "next" | "n" => Action::Next,
        "prev" | "p" => Action::Prev,
        "goto" | "g" => match number("goto")? {
            0 => return Err("pages start at 1".to_string()),
            page => Action::Goto(page),
        },
        "size" => Action::Size(number("size")?),
        "search" | "s" => Action::Search(rest.to_string()),
        "status" => Action::Status(rest.split_whitespace().map(str::to_string).collect()),
        "name" => {
            let mut parts = rest.split_whitespace().map(|p| if p == "-" { "" } else { p });
            let first = parts.next().unwrap_or_default();
            let last = parts.next().unwrap_or_default();
            Action::Name(NameFilter::new(first, last))
        }
        "retry" | "r" => Action::Retry,
        "help" | "h" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => return Err(format!("unknown command {other:?}; type `help`")),
    };
    Ok(Some(action))
}

async fn apply(session: &ListSession, config: &Config, storage: Option<&SafeStorage>, action: Action) -> Result<()> {
    match action {
        Action::Next => session.next_page().await?,
        Action::Prev => session.previous_page().await?,
        Action::Goto(page) => session.set_page(page - 1).await?,
        Action::Size(size) => {
            let options = &config.list.page_size_options;
            if !options.contains(&size) {
                bail!("page size {size} is not one of {options:?}");
            }
            session.set_page_size(size).await?;
            if let Some(storage) = storage {
                storage.set_item(PAGE_SIZE_KEY, &size.to_string());
            }
        }
        Action::Search(term) => session.type_search(term).await?,
        Action::Status(statuses) => session.set_status_filters(statuses).await?,
        Action::Name(names) => session.set_name_filter(names).await?,
        Action::Retry => session.retry().await?,
        Action::Help => println!("{HELP}"),
        Action::Quit => {}
    }
    Ok(())
}

pub async fn run(session: &ListSession, config: &Config, storage: Option<&SafeStorage>) -> Result<()> {
    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            print!("{}", render::render_list(&view));
        }
    });

    println!("{HELP}");
    session.load().await?;
    info!("browse session ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        match parse(&line) {
            Ok(Some(Action::Quit)) => break,
            Ok(Some(action)) => {
                if let Err(e) = apply(session, config, storage, action).await {
                    eprintln!("error: {e:#}");
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }

    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_navigation() {
        assert_eq!(parse(" next "), Ok(Some(Action::Next)));
        assert_eq!(parse("p"), Ok(Some(Action::Prev)));
        assert_eq!(parse("goto 3"), Ok(Some(Action::Goto(3))));
        assert!(parse("goto 0").is_err());
        assert!(parse("size ten").is_err());
        assert_eq!(parse(""), Ok(None));
    }

    #[test]
    fn test_search_keeps_the_whole_phrase() {
        assert_eq!(parse("search john doe"), Ok(Some(Action::Search("john doe".into()))));
        assert_eq!(parse("search"), Ok(Some(Action::Search(String::new()))));
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            parse("status active pending"),
            Ok(Some(Action::Status(vec!["active".into(), "pending".into()])))
        );
        assert_eq!(parse("name - Doe"), Ok(Some(Action::Name(NameFilter::new("", "Doe")))));
        assert_eq!(parse("name"), Ok(Some(Action::Name(NameFilter::default()))));
    }

    #[test]
    fn test_rejects_unknown_commands() {
        assert!(parse("delete 3").unwrap_err().contains("unknown command"));
    }
}
