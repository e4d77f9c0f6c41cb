//! Icon tokens and the glyphs drawn for them.
//!
//! The core treats a role or goal icon as an opaque string. Tokens are
//! either a glyph already (the built-in entries use emoji) or one of the
//! names below.

pub const ROLE_ICONS: &[(&str, &str)] = &[
    ("briefcase", "💼"),
    ("books", "📚"),
    ("speech", "💬"),
    ("necktie", "👔"),
    ("palette", "🎨"),
    ("laptop", "💻"),
    ("house", "🏠"),
    ("technologist", "👨‍💻"),
    ("teacher", "👩‍🏫"),
    ("doctor", "👨‍⚕️"),
    ("cook", "👩‍🍳"),
    ("mechanic", "👨‍🔧"),
    ("office-worker", "🧑‍💼"),
    ("artist", "👩‍🎨"),
    ("scientist", "🧑‍🔬"),
];

pub const GOAL_ICONS: &[(&str, &str)] = &[
    ("target", "🎯"),
    ("calendar", "📅"),
    ("handshake", "🤝"),
    ("envelope", "📨"),
    ("pray", "🙏"),
    ("dove", "🕊️"),
    ("bulb", "💡"),
    ("heart", "❤️"),
    ("check", "✅"),
    ("rocket", "🚀"),
    ("money", "💰"),
    ("phone", "📞"),
    ("star", "⭐"),
    ("trophy", "🏆"),
    ("fire", "🔥"),
];

/// Resolve an icon token to the glyph to draw
pub fn glyph(token: &str) -> &str {
    if token.trim().is_empty() {
        return "•";
    }
    ROLE_ICONS
        .iter()
        .chain(GOAL_ICONS.iter())
        .find(|(name, _)| *name == token)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(token)
}

/// Step through a palette from the current glyph, wrapping around.
/// Unknown glyphs start from the first entry.
pub fn cycle(palette: &[(&str, &'static str)], current: &str, forward: bool) -> &'static str {
    let len = palette.len();
    let next = match palette.iter().position(|(_, g)| *g == glyph(current)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    palette[next].1
}
