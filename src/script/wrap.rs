/// Default line width of the dialogue box, in characters.
pub const DEFAULT_WRAP_WIDTH: usize = 34;

/// Greedy word wrap for the dialogue box.
///
/// Every word is followed by a single space (including the last one), and a line break is
/// inserted before a word once the current line plus that word and its space would reach
/// `max_line_chars`. The check also applies on an empty line, so a first word that fills the
/// box on its own is preceded by a line break. Existing line breaks inside the text reset the
/// line width, but a word containing one is measured whole.
pub fn wrap_dialogue(text: &str, max_line_chars: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / max_line_chars.max(1) + 1);
    let mut line_len = 0usize;

    for word in text.split(' ') {
        if line_len + word.chars().count() + 1 >= max_line_chars {
            out.push('\n');
            line_len = 0;
        }
        out.push_str(word);
        out.push(' ');

        line_len = match word.rfind('\n') {
            Some(idx) => word[idx + 1..].chars().count() + 1,
            None => line_len + word.chars().count() + 1,
        };
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/script/wrap.rs"]
mod tests;
