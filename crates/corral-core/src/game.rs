//! Normal-form and Bayesian games with one payoff per player.
//!
//! A game with `N` players assigns to every player a number of *types*
//! (private information dealt by nature before each play) and a number of
//! *choices*. Every cell `(type_1..type_N, choice_1..choice_N)` holds a
//! payoff vector `(payoff_1..payoff_N)`.
//!
//! Games are written down as nested lists ([`PayoffTree`]):
//! `game[type_1]..[type_N][choice_1]..[choice_N] = [payoff_1, .., payoff_N]`.
//! The type levels may be omitted for a game without private information.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Payoff trees
// ============================================================================

/// Nested-list notation of a game.
///
/// Deserialises from plain nested arrays of numbers, e.g. the TOML value
/// `payoffs = [[[1, 1], [-1, -1]], [[-1, -1], [1, 1]]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayoffTree {
    /// A single payoff.
    Leaf(f64),
    /// One nesting level.
    Node(Vec<PayoffTree>),
}

impl PayoffTree {
    /// Lengths of the nesting levels, read along first children.
    pub fn nest_lengths(&self) -> Vec<usize> {
        let mut lengths = Vec::new();
        let mut node = self;
        while let PayoffTree::Node(children) = node {
            lengths.push(children.len());
            match children.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        lengths
    }

    /// The general form of a coordinated game.
    ///
    /// Every leaf `x` becomes a vector `[x, .., x]` of length `N`, where `N`
    /// is the nesting depth of the tree, i.e. the number of players of a
    /// game in which all players share one payoff.
    ///
    /// # Examples
    ///
    /// ```
    /// use corral_core::PayoffTree;
    ///
    /// let equal: PayoffTree = serde_json::from_str("[[1, -1], [-1, 1]]").unwrap();
    /// let coordinated: PayoffTree =
    ///     serde_json::from_str("[[[1, 1], [-1, -1]], [[-1, -1], [1, 1]]]").unwrap();
    /// assert_eq!(equal.coordinated(), coordinated);
    /// ```
    pub fn coordinated(&self) -> PayoffTree {
        let players = self.nest_lengths().len();
        self.map_leaves(&|x| PayoffTree::Node(vec![PayoffTree::Leaf(x); players]))
    }

    fn map_leaves(&self, f: &dyn Fn(f64) -> PayoffTree) -> PayoffTree {
        match self {
            PayoffTree::Leaf(x) => f(*x),
            PayoffTree::Node(children) => {
                PayoffTree::Node(children.iter().map(|c| c.map_leaves(f)).collect())
            }
        }
    }

    fn flatten_into(&self, lengths: &[usize], level: usize, out: &mut Vec<f64>) -> Result<()> {
        match self {
            PayoffTree::Leaf(x) if level == lengths.len() => {
                out.push(*x);
                Ok(())
            }
            PayoffTree::Leaf(_) => Err(Error::misdefined_game(format!(
                "payoff found at nesting level {level}, expected level {}",
                lengths.len()
            ))),
            PayoffTree::Node(children) => {
                let expected = lengths.get(level).copied().ok_or_else(|| {
                    Error::misdefined_game(format!("unexpected list at nesting level {level}"))
                })?;
                if children.len() != expected {
                    return Err(Error::misdefined_game(format!(
                        "ragged nesting level {level}: found {} entries, expected {expected}",
                        children.len()
                    )));
                }
                children
                    .iter()
                    .try_for_each(|child| child.flatten_into(lengths, level + 1, out))
            }
        }
    }
}

// ============================================================================
// Game
// ============================================================================

/// A finite game with per-player types, choices and payoffs.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    type_counts: Vec<usize>,
    choice_counts: Vec<usize>,
    /// Row-major over `(types.., choices.., player)`.
    payoffs: Vec<f64>,
}

impl Game {
    /// Reads a game from its nested-list notation.
    ///
    /// The innermost list length is the number of players `N`. A tree of
    /// depth `N + 1` is a game without types; a tree of depth `2N + 1` is a
    /// Bayesian game. Every other shape is rejected.
    pub fn from_tree(tree: &PayoffTree) -> Result<Self> {
        let lengths = tree.nest_lengths();
        if lengths.contains(&0) {
            return Err(Error::misdefined_game("empty list in payoff tree"));
        }
        let players = *lengths
            .last()
            .ok_or_else(|| Error::misdefined_game("a game needs at least one player"))?;

        let (type_counts, choice_counts) = if lengths.len() == players + 1 {
            (vec![1; players], lengths[..players].to_vec())
        } else if lengths.len() == 2 * players + 1 {
            (
                lengths[..players].to_vec(),
                lengths[players..2 * players].to_vec(),
            )
        } else {
            return Err(Error::misdefined_game(format!(
                "nesting lengths {lengths:?} fit neither {players} players without types \
                 nor {players} players with types"
            )));
        };

        // The lengths follow the first child only; their product may
        // overflow before the walk below finds a ragged list.
        let mut payoffs = Vec::new();
        tree.flatten_into(&lengths, 0, &mut payoffs)?;

        tracing::debug!(?type_counts, ?choice_counts, "Parsed game from payoff tree");
        Ok(Self {
            type_counts,
            choice_counts,
            payoffs,
        })
    }

    /// Builds a game by evaluating `payoff(types, choices)` on every cell.
    pub fn from_fn<F>(
        type_counts: &[usize],
        choice_counts: &[usize],
        mut payoff: F,
    ) -> Result<Self>
    where
        F: FnMut(&[usize], &[usize]) -> Vec<f64>,
    {
        let players = choice_counts.len();
        if players == 0 {
            return Err(Error::misdefined_game("a game needs at least one player"));
        }
        if type_counts.len() != players {
            return Err(Error::misdefined_game(format!(
                "{} type counts for {players} players",
                type_counts.len()
            )));
        }
        if type_counts.contains(&0) || choice_counts.contains(&0) {
            return Err(Error::misdefined_game("every player needs a type and a choice"));
        }

        let mut payoffs = Vec::new();
        for types in profiles(type_counts) {
            for choices in profiles(choice_counts) {
                let cell = payoff(&types, &choices);
                if cell.len() != players {
                    return Err(Error::misdefined_game(format!(
                        "payoff vector of length {} for {players} players",
                        cell.len()
                    )));
                }
                payoffs.extend(cell);
            }
        }
        Ok(Self {
            type_counts: type_counts.to_vec(),
            choice_counts: choice_counts.to_vec(),
            payoffs,
        })
    }

    /// The CHSH game as a coordinated Bayesian game.
    ///
    /// Both players win (`+1`) when their choices agree, unless both were
    /// dealt type 1, in which case they win when their choices differ.
    /// Otherwise both lose (`-1`).
    pub fn chsh() -> Self {
        let mut payoffs = Vec::with_capacity(32);
        for t1 in 0..2 {
            for t2 in 0..2 {
                for c1 in 0..2 {
                    for c2 in 0..2 {
                        let wins = ((c1 ^ c2) == 1) == (t1 == 1 && t2 == 1);
                        let payoff = if wins { 1.0 } else { -1.0 };
                        payoffs.extend([payoff, payoff]);
                    }
                }
            }
        }
        Self {
            type_counts: vec![2, 2],
            choice_counts: vec![2, 2],
            payoffs,
        }
    }

    /// Number of players.
    pub fn player_count(&self) -> usize {
        self.choice_counts.len()
    }

    /// Number of types of each player.
    pub fn type_counts(&self) -> &[usize] {
        &self.type_counts
    }

    /// Number of choices of each player.
    pub fn choice_counts(&self) -> &[usize] {
        &self.choice_counts
    }

    /// Whether any player has more than one type.
    pub fn is_bayesian(&self) -> bool {
        self.type_counts.iter().any(|t| *t > 1)
    }

    /// All type profiles in lexicographic order.
    pub fn type_profiles(&self) -> Vec<Vec<usize>> {
        profiles(&self.type_counts)
    }

    /// Position of a type profile in [`Game::type_profiles`].
    pub fn type_profile_index(&self, types: &[usize]) -> Result<usize> {
        mixed_radix_index(&self.type_counts, types, "type")
    }

    /// Payoff vector of one cell.
    pub fn payoffs(&self, types: &[usize], choices: &[usize]) -> Result<&[f64]> {
        let type_index = self.type_profile_index(types)?;
        let choice_index = mixed_radix_index(&self.choice_counts, choices, "choice")?;
        let cells_per_type: usize = self.choice_counts.iter().product();
        let players = self.player_count();
        let start = (type_index * cells_per_type + choice_index) * players;
        Ok(&self.payoffs[start..start + players])
    }

    /// Payoff vector averaged over independent mixed strategies.
    ///
    /// `mixed[i][c]` is the probability that player `i` picks choice `c`.
    pub fn expected_payoffs(&self, types: &[usize], mixed: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.type_profile_index(types)?;
        let players = self.player_count();
        if mixed.len() != players {
            return Err(Error::invalid_profile(format!(
                "{} mixed strategies for {players} players",
                mixed.len()
            )));
        }
        for (player, (strategy, count)) in mixed.iter().zip(&self.choice_counts).enumerate() {
            if strategy.len() != *count {
                return Err(Error::invalid_profile(format!(
                    "player {player} has {count} choices, mixed strategy has {}",
                    strategy.len()
                )));
            }
        }

        let mut expected = vec![0.0; players];
        for choices in profiles(&self.choice_counts) {
            let probability: f64 = choices
                .iter()
                .zip(mixed)
                .map(|(c, strategy)| strategy[*c])
                .product();
            if probability == 0.0 {
                continue;
            }
            for (e, p) in expected.iter_mut().zip(self.payoffs(types, &choices)?) {
                *e += probability * p;
            }
        }
        Ok(expected)
    }
}

/// All index vectors `v` with `v[i] < counts[i]`, in lexicographic order.
pub fn profiles(counts: &[usize]) -> Vec<Vec<usize>> {
    let mut all = vec![Vec::with_capacity(counts.len())];
    for count in counts {
        all = all
            .into_iter()
            .flat_map(|prefix| {
                (0..*count).map(move |i| {
                    let mut next = prefix.clone();
                    next.push(i);
                    next
                })
            })
            .collect();
    }
    all
}

fn mixed_radix_index(counts: &[usize], digits: &[usize], what: &str) -> Result<usize> {
    if digits.len() != counts.len() {
        return Err(Error::invalid_profile(format!(
            "{what} profile of length {} for {} players",
            digits.len(),
            counts.len()
        )));
    }
    let mut index = 0;
    for (player, (digit, count)) in digits.iter().zip(counts).enumerate() {
        if digit >= count {
            return Err(Error::invalid_profile(format!(
                "{what} {digit} out of range for player {player} ({count} available)"
            )));
        }
        index = index * count + digit;
    }
    Ok(index)
}
