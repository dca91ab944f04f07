//! Crate root module declarations for the Arbor Chess engine.
//!
//! Exposes the board adapter, the tree search, the engine facade and the UCI
//! front-end so the binary, benches and external hosts can import stable
//! module paths.

pub mod errors;

pub mod oracle {
    pub mod board_oracle;
    pub mod chess_board;
    #[cfg(test)]
    pub mod test_support;
}

pub mod search {
    pub mod alpha_beta;
    pub mod board_scoring;
    pub mod move_ordering;
    pub mod node;
    pub mod phase;
    pub mod tree_cache;
}

pub mod engines {
    pub mod conversation;
    pub mod engine_alpha_beta;
    pub mod engine_trait;
    pub mod time_management;
}

pub mod uci {
    pub mod uci_top;
}
