//! Prompt templates (French output)

/// Biography request for a named character
pub fn biography_prompt(character: &str) -> String {
    format!(
        "Génère une biographie détaillée et captivante de {} de Star Wars en français. \
         Inclus son histoire, ses compétences, et son importance dans la saga. \
         Fais environ 200-300 mots.",
        character
    )
}

/// Short story request, optionally constrained to a theme.
/// A blank theme is treated as no theme.
pub fn story_prompt(theme: Option<&str>) -> String {
    let mut prompt =
        String::from("Écris une histoire courte et captivante dans l'univers Star Wars en français");
    if let Some(theme) = theme.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str(" sur le thème suivant : ");
        prompt.push_str(theme);
    }
    prompt.push_str(". L'histoire doit être originale, immersive et faire environ 300-400 mots.");
    prompt
}
