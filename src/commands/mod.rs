//! # Command line protocol.
//!
//! One input line is one command: a name followed by space-separated
//! `-flag=value` tokens.
//!
//! ```text
//! raw line ──► Input::parse
//!                ├─► None                  (blank line)
//!                ├─► Input::Exit           (control, handled by the dispatcher)
//!                ├─► Input::SetCeiling     (control, handled by the dispatcher)
//!                └─► Input::Invoke(inv)    (everything else, sent to an executor)
//!                          │
//!                          └─► Operation::from_name(&inv.name)
//!                                ├─ Some(op) → validation + order service
//!                                └─ None     → UnknownCommand
//! ```

mod args;

pub use args::Flags;

/// Name of the exit control command.
pub const EXIT: &str = "exit";
/// Name of the ceiling reconfiguration control command.
pub const SET_CEILING: &str = "set_mg";

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Raise the shutdown flag.
    Exit,
    /// Reconfigure the concurrency ceiling; raw tokens after the name.
    SetCeiling(Vec<String>),
    /// Any other command; resolved by the executor.
    Invoke(Invocation),
}

impl Input {
    /// Tokenizes and classifies a raw line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let name = tokens.next()?;
        let args: Vec<String> = tokens.collect();
        Some(match name.as_str() {
            EXIT => Input::Exit,
            SET_CEILING => Input::SetCeiling(args),
            _ => Input::Invoke(Invocation { name, args }),
        })
    }
}

/// A tokenized command bound for an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command name as typed.
    pub name: String,
    /// Tokens after the name.
    pub args: Vec<String>,
}

/// Commands executed by the executor through the collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `help`: print the command table.
    Help,
    /// `accept`: take an order from a courier.
    Accept,
    /// `return_courier`: hand an unissued order back to the courier.
    ReturnToCourier,
    /// `issue`: give orders to their client.
    Issue,
    /// `accept_return`: take back an issued order from its client.
    AcceptReturn,
    /// `list_returns`: list returned orders.
    ListReturns,
    /// `list_orders`: list one client's orders.
    ListOrders,
}

impl Operation {
    /// Resolves a command name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "help" => Operation::Help,
            "accept" => Operation::Accept,
            "return_courier" => Operation::ReturnToCourier,
            "issue" => Operation::Issue,
            "accept_return" => Operation::AcceptReturn,
            "list_returns" => Operation::ListReturns,
            "list_orders" => Operation::ListOrders,
            _ => return None,
        })
    }

    /// Flags this operation understands.
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Operation::Help => &[],
            Operation::Accept => &["id", "u_id", "date", "price", "w", "p"],
            Operation::ReturnToCourier => &["id"],
            Operation::Issue => &["ids"],
            Operation::AcceptReturn => &["id", "u_id"],
            Operation::ListReturns => &["lmt", "ofs"],
            Operation::ListOrders => &["u_id", "lmt", "ofs"],
        }
    }
}

/// Help table entry.
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub example: &'static str,
}

/// Every command the shell understands, in help order.
pub const CATALOG: &[CommandInfo] = &[
    CommandInfo {
        name: "help",
        description: "Show this help",
        example: "",
    },
    CommandInfo {
        name: "accept",
        description: "Accept an order from a courier",
        example: "accept -id=12345 -u_id=54321 -date=2077-06-06 -price=999.99 -w=10 -p=box",
    },
    CommandInfo {
        name: "return_courier",
        description: "Return an order to the courier",
        example: "return_courier -id=12345",
    },
    CommandInfo {
        name: "issue",
        description: "Issue orders to a client",
        example: "issue -ids=1,2,3",
    },
    CommandInfo {
        name: "accept_return",
        description: "Accept a return from a client",
        example: "accept_return -id=1 -u_id=2",
    },
    CommandInfo {
        name: "list_returns",
        description: "List returned orders",
        example: "list_returns -lmt=10 -ofs=0",
    },
    CommandInfo {
        name: "list_orders",
        description: "List a client's orders",
        example: "list_orders -u_id=1 -lmt=10 -ofs=0",
    },
    CommandInfo {
        name: SET_CEILING,
        description: "Set max concurrent commands",
        example: "set_mg -n=1",
    },
    CommandInfo {
        name: EXIT,
        description: "Exit",
        example: "",
    },
];

/// Renders [`CATALOG`] as a fixed-width table.
pub fn help_table() -> String {
    let mut out = String::from("Command list:\n");
    out.push_str(&format!(
        "{:<15} | {:<30} | {}\n",
        "Command", "Description", "Example"
    ));
    out.push_str(&"-".repeat(99));
    out.push('\n');
    for info in CATALOG {
        out.push_str(&format!(
            "{:<15} | {:<30} | {}\n",
            info.name, info.description, info.example
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(Input::parse(""), None);
        assert_eq!(Input::parse("   \t "), None);
    }

    #[test]
    fn test_control_commands() {
        assert_eq!(Input::parse("exit"), Some(Input::Exit));
        assert_eq!(Input::parse("  exit  "), Some(Input::Exit));
        assert_eq!(
            Input::parse("set_mg -n=3"),
            Some(Input::SetCeiling(vec!["-n=3".to_string()]))
        );
    }

    #[test]
    fn test_exit_requires_exact_name() {
        assert!(matches!(Input::parse("exitnow"), Some(Input::Invoke(_))));
    }

    #[test]
    fn test_invocation_tokens() {
        let Some(Input::Invoke(inv)) = Input::parse("accept  -id=1 -u_id=2") else {
            panic!("expected invocation");
        };
        assert_eq!(inv.name, "accept");
        assert_eq!(inv.args, vec!["-id=1", "-u_id=2"]);
        assert_eq!(Operation::from_name(&inv.name), Some(Operation::Accept));
    }

    #[test]
    fn test_catalog_covers_operations() {
        for info in CATALOG {
            let known = Operation::from_name(info.name).is_some()
                || info.name == EXIT
                || info.name == SET_CEILING;
            assert!(known, "{} missing from Operation", info.name);
        }
        assert!(help_table().contains("return_courier"));
    }
}
