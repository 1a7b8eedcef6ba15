//! Column names of the match table on chroniquesbleues.fr.

/// Match sequence number.
pub const NUMBER: &str = "#";
/// Match category (men's / women's team).
pub const GENRE: &str = "Genre";
pub const DATE: &str = "Date";
/// Host city.
pub const VILLE: &str = "Ville";
/// Opponent.
pub const ADVERSAIRE: &str = "Adversaire";
pub const SCORE: &str = "score";

/// The columns kept in the output, in output order.
pub const MATCH_COLUMNS: [&str; 6] = [NUMBER, GENRE, DATE, VILLE, ADVERSAIRE, SCORE];

/// [`MATCH_COLUMNS`] as owned strings, for configuration structs.
pub fn match_columns() -> Vec<String> {
    MATCH_COLUMNS.iter().map(|c| c.to_string()).collect()
}
