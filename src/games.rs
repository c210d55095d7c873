use crate::model::{Category, RankDirection, RoundSlot, SectionId};

/// Carrera de Dados buckets, in table order.
pub static DICE_CATEGORIES: [Category; 6] = [
    Category { code: "N", word: "negros", label: "Negros (1 pto)", multiplier: 1 },
    Category { code: "R", word: "rojos", label: "Rojos (2 ptos)", multiplier: 2 },
    Category { code: "J", word: "jotas", label: "Jotas (3 ptos)", multiplier: 3 },
    Category { code: "Q", word: "reinas", label: "Reinas (4 ptos)", multiplier: 4 },
    Category { code: "K", word: "reyes", label: "Reyes (5 ptos)", multiplier: 5 },
    Category { code: "AS", word: "ases", label: "Ases (6 ptos)", multiplier: 6 },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundScheme {
    /// Same column count for any roster (Continental).
    FixedCount(usize),
    /// Pocha ladder: 1 repeated per player, up to deck/players cards and
    /// back down, 1 repeated per player again at the end.
    CardLadder { deck_size: usize },
    /// Free section then forced section, one column per category (dice).
    TwoSection,
    /// Columns grow as they fill up (Dominó, Avaricioso).
    Open { initial_rounds: usize },
}

pub struct GameDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub direction: RankDirection,
    pub scheme: RoundScheme,
    pub categories: &'static [Category],
    /// Point goal (Avaricioso) or elimination limit (Dominó).
    pub default_target: Option<i32>,
}

pub static GAMES: [GameDescriptor; 5] = [
    GameDescriptor {
        key: "continental",
        name: "Continental",
        direction: RankDirection::LowerWins,
        scheme: RoundScheme::FixedCount(6),
        categories: &[],
        default_target: None,
    },
    GameDescriptor {
        key: "pocha",
        name: "Pocha",
        direction: RankDirection::HigherWins,
        scheme: RoundScheme::CardLadder { deck_size: 40 },
        categories: &[],
        default_target: None,
    },
    GameDescriptor {
        key: "domino",
        name: "Dominó",
        direction: RankDirection::LowerWins,
        scheme: RoundScheme::Open { initial_rounds: 10 },
        categories: &[],
        default_target: Some(100),
    },
    GameDescriptor {
        key: "avaricioso",
        name: "El Avaricioso",
        direction: RankDirection::HigherWins,
        scheme: RoundScheme::Open { initial_rounds: 10 },
        categories: &[],
        default_target: Some(5000),
    },
    GameDescriptor {
        key: "dados",
        name: "Carrera de Dados",
        direction: RankDirection::HigherWins,
        scheme: RoundScheme::TwoSection,
        categories: &DICE_CATEGORIES,
        default_target: None,
    },
];

#[must_use]
pub fn descriptor(key: &str) -> Option<&'static GameDescriptor> {
    GAMES.iter().find(|g| g.key == key)
}

impl GameDescriptor {
    #[must_use]
    pub fn is_open_ended(&self) -> bool {
        matches!(self.scheme, RoundScheme::Open { .. })
    }

    /// Look a category up by its code or its spoken word.
    #[must_use]
    pub fn category(&self, token: &str) -> Option<&'static Category> {
        let token = token.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.code.to_lowercase() == token || c.word == token)
    }

    /// Build the column sequence for the given roster size.
    #[must_use]
    pub fn round_plan(&self, n_players: usize) -> Vec<RoundSlot> {
        match self.scheme {
            RoundScheme::FixedCount(n) => (1..=n)
                .map(|i| RoundSlot { label: i.to_string(), category: None, section: None })
                .collect(),
            RoundScheme::CardLadder { deck_size } => card_ladder(deck_size, n_players),
            RoundScheme::TwoSection => {
                let mut slots = Vec::with_capacity(self.categories.len() * 2);
                for section in [SectionId::Free, SectionId::Forced] {
                    for cat in self.categories {
                        slots.push(RoundSlot {
                            label: cat.code.to_string(),
                            category: Some(cat),
                            section: Some(section),
                        });
                    }
                }
                slots
            }
            RoundScheme::Open { initial_rounds } => (1..=initial_rounds)
                .map(|i| RoundSlot { label: i.to_string(), category: None, section: None })
                .collect(),
        }
    }
}

/// The pocha sequence for a 40-card deck: the 1-card round once per player,
/// 2 up to the maximum once each, the maximum once per player, back down to
/// 2, and the 1-card round once per player to close.
fn card_ladder(deck_size: usize, n_players: usize) -> Vec<RoundSlot> {
    let n = n_players.max(1);
    let max_cards = (deck_size / n).max(1);
    let mut cards: Vec<usize> = Vec::new();

    for i in 1..=max_cards {
        let reps = if i == 1 || i == max_cards { n } else { 1 };
        for _ in 0..reps {
            cards.push(i);
        }
    }
    for i in (2..max_cards).rev() {
        cards.push(i);
    }
    if max_cards > 1 {
        for _ in 0..n {
            cards.push(1);
        }
    }

    cards
        .into_iter()
        .map(|c| RoundSlot { label: c.to_string(), category: None, section: None })
        .collect()
}
