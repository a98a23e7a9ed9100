const ICON_PLAYING: char = '\u{f04b}';
const ICON_PAUSED: char = '\u{f04c}';
const ICON_LYRIC: char = '\u{f0ba1}';
const ICON_MUSIC: char = '\u{f075a}';

/// Waybar module definition running `lyricbar` with the given text length.
pub fn snippet(max_length: usize) -> String {
    format!(
        r#""custom/lyrics": {{
    "return-type": "json",
    "format": "{{icon}} {{0}}",
    "hide-empty-text": true,
    "format-icons": {{
        "playing": "{ICON_PLAYING}",
        "paused": "{ICON_PAUSED}",
        "lyric": "{ICON_LYRIC}",
        "music": "{ICON_MUSIC}"
    }},
    "exec-if": "which lyricbar",
    "exec": "lyricbar --quiet --max-length {max_length}",
    "on-click": "lyricbar play-pause"
}},"#
    )
}

pub fn print(max_length: usize) {
    eprintln!("Put the following object in your waybar config:\n");
    println!("{}", snippet(max_length));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_uses_max_length() {
        let snippet = snippet(42);
        assert!(snippet.starts_with("\"custom/lyrics\": {"));
        assert!(snippet.contains("\"exec\": \"lyricbar --quiet --max-length 42\""));
        assert!(snippet.contains("\"format\": \"{icon} {0}\""));
    }
}
