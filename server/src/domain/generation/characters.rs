//! Character roster offered by the biography page

use rand::seq::SliceRandom;

pub const CHARACTERS: &[&str] = &[
    "Luke Skywalker",
    "Leia Organa",
    "Han Solo",
    "Darth Vader",
    "Obi-Wan Kenobi",
    "Yoda",
    "Rey",
    "Kylo Ren",
    "Ahsoka Tano",
    "Mace Windu",
    "Qui-Gon Jinn",
    "Padmé Amidala",
    "Anakin Skywalker",
    "Chewbacca",
    "R2-D2",
    "C-3PO",
    "Boba Fett",
    "Grogu",
];

/// Pick a character uniformly at random
pub fn random_character() -> &'static str {
    // The roster is a non-empty constant
    CHARACTERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CHARACTERS[0])
}
