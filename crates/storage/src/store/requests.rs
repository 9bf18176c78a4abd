#![forbid(unsafe_code)]

use ttaat_core::StatementIndex;

#[derive(Clone, Debug)]
pub struct CreateRoundRequest {
    pub category: String,
    pub question: String,
    pub trivia_1: String,
    pub trivia_2: String,
    pub trivia_3: String,
}

#[derive(Clone, Debug)]
pub struct RevealTwistRequest {
    pub round_id: i64,
    pub twist_index: StatementIndex,
    pub explanation_1: String,
    pub explanation_2: String,
    pub explanation_3: String,
}
