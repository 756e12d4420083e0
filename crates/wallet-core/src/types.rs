use serde::{Deserialize, Serialize};

/// Address chain within a BIP-84 account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Receive,
    Change,
}

impl ChainType {
    /// Non-hardened branch index in `m/84'/coin'/account'/branch/index`.
    pub fn branch(self) -> u32 {
        match self {
            ChainType::Receive => 0,
            ChainType::Change => 1,
        }
    }
}

impl std::fmt::Display for ChainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainType::Receive => write!(f, "receive"),
            ChainType::Change => write!(f, "change"),
        }
    }
}

/// Next-unused index of each chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDepths {
    pub receive: u32,
    pub change: u32,
}

impl ChainDepths {
    pub fn get(&self, chain: ChainType) -> u32 {
        match chain {
            ChainType::Receive => self.receive,
            ChainType::Change => self.change,
        }
    }

    pub fn set(&mut self, chain: ChainType, depth: u32) {
        match chain {
            ChainType::Receive => self.receive = depth,
            ChainType::Change => self.change = depth,
        }
    }
}

/// Sum of discovered coin values in satoshis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub confirmed_sat: u64,
    pub unconfirmed_sat: u64,
}

impl Balance {
    pub fn total_sat(&self) -> u64 {
        self.confirmed_sat + self.unconfirmed_sat
    }
}
