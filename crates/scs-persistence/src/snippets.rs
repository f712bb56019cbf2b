//! Built-in example contracts offered next to the saved ones.

use chrono::{DateTime, Utc};
use scs_model::SavedContract;
use serde::Serialize;

/// A read-only example contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sourcecode: &'static str,
}

impl Snippet {
    /// The snippet as a contract the session can load.
    ///
    /// Snippets are timeless, so the epoch stands in for a save time.
    pub fn to_saved(&self) -> SavedContract {
        SavedContract {
            name: self.name.to_string(),
            sourcecode: self.sourcecode.to_string(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

const TOKEN: &str = r#"pragma solidity ^0.4.11;

contract Token {
    mapping (address => uint256) public balanceOf;

    event Transfer(address indexed from, address indexed to, uint256 value);

    function Token(uint256 initialSupply) {
        balanceOf[msg.sender] = initialSupply;
    }

    function transfer(address to, uint256 value) returns (bool) {
        if (balanceOf[msg.sender] < value) throw;
        if (balanceOf[to] + value < balanceOf[to]) throw;
        balanceOf[msg.sender] -= value;
        balanceOf[to] += value;
        Transfer(msg.sender, to, value);
        return true;
    }
}
"#;

const OWNED: &str = r#"pragma solidity ^0.4.11;

contract Owned {
    address public owner;

    event OwnerChanged(address indexed previous, address indexed next);

    modifier onlyOwner {
        if (msg.sender != owner) throw;
        _;
    }

    function Owned() {
        owner = msg.sender;
    }

    function setOwner(address next) onlyOwner {
        OwnerChanged(owner, next);
        owner = next;
    }
}
"#;

const GREETER: &str = r#"pragma solidity ^0.4.11;

contract Greeter {
    string greeting;

    function Greeter(string initial) {
        greeting = initial;
    }

    function greet() constant returns (string) {
        return greeting;
    }

    function setGreeting(string next) {
        greeting = next;
    }
}
"#;

/// All built-in snippets.
pub fn snippets() -> Vec<Snippet> {
    vec![
        Snippet {
            id: "token",
            name: "Token",
            description: "A minimal fixed-supply token with transfers.",
            sourcecode: TOKEN,
        },
        Snippet {
            id: "owned",
            name: "Owned",
            description: "Ownership with a transferable owner address.",
            sourcecode: OWNED,
        },
        Snippet {
            id: "greeter",
            name: "Greeter",
            description: "Stores and returns a greeting.",
            sourcecode: GREETER,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_as_saved_contract() {
        let token = snippets().into_iter().find(|s| s.id == "token").unwrap();
        let saved = token.to_saved();
        assert_eq!(saved.name, "Token");
        assert!(saved.sourcecode.contains("contract Token"));
    }
}
