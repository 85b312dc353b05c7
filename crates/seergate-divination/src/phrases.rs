//! Static phrase tables for reading synthesis.
//!
//! Category keys arrive lowercased from the frequency ranking; unknown keys
//! fall through to `None` and the synthesizer substitutes generic phrasing.

/// Vibe categories substituted when no signals exist at all.
pub const DEFAULT_VIBE: [&str; 3] = ["playful", "symbolic", "intuitive"];

/// Edge categories substituted when no memories exist at all.
pub const DEFAULT_EDGE: [&str; 1] = ["truth"];

/// Card line used when the spread is empty.
pub const NO_SPREAD_LINE: &str = "No spread captured.";

/// Formal realm name used in reading titles.
#[must_use]
pub fn realm_name(key: &str) -> Option<&'static str> {
    match key {
        "threshold" => Some("Realm I: The Threshold"),
        "lantern" => Some("Realm II: The Lantern Room"),
        "mirror" => Some("Realm III: The Mirror Hall"),
        "veil" => Some("Realm IV: The Veil Market"),
        _ => None,
    }
}

/// Display label for the header, covering the extended realm set.
#[must_use]
pub fn realm_label(key: &str) -> &'static str {
    match key {
        "threshold" => "Realm I — The Threshold",
        "lantern" => "Realm II — The Lantern Room",
        "mirror" => "Realm III — The Mirror Hall",
        "veil" => "Realm IV — The Veil Market",
        "traveler" => "Realm I — Traveler",
        "hearth" => "Realm II — The Hearth",
        "wild" => "Realm IV — The Wild",
        "crown" => "Realm V — The Crown",
        _ => "The Gate",
    }
}

/// The realm the Gate unlocks after `key`, if any remain.
#[must_use]
pub fn next_realm(key: &str) -> Option<&'static str> {
    match key {
        "threshold" => Some("lantern"),
        "lantern" => Some("mirror"),
        "mirror" => Some("veil"),
        _ => None,
    }
}

/// Voice line for a vibe category.
#[must_use]
pub fn vibe_line(category: &str) -> Option<&'static str> {
    match category {
        "playful" => Some("Playful, dangerous-in-a-good-way energy. You don't want boring."),
        "intuitive" => {
            Some("You read what's underneath. You notice patterns most people miss.")
        }
        "symbolic" => {
            Some("You speak in symbols and meaning. Surface-level doesn't satisfy you.")
        }
        "grounded" => Some("You want it real. Calm. Clean. No performative nonsense."),
        "sensual" => Some("Chemistry matters. You can feel intent before a word is spoken."),
        "guarded" => Some("You protect your peace. Not cold, just selective."),
        "adventurous" => Some("You need air. Movement. Yeses that feel alive."),
        "devotion" => Some("You want something that holds. Something built, not just felt."),
        "mysterious" => Some("You like layers. Slow reveals. The good kind of intrigue."),
        "funny" => Some("You use humor as a signal: 'Are you safe? Are you sharp?'"),
        _ => None,
    }
}

/// Voice line for an edge category.
#[must_use]
pub fn edge_line(category: &str) -> Option<&'static str> {
    match category {
        "truth" => Some("Truth is your religion. Anything fake gets rejected fast."),
        "escape" => Some("Freedom is oxygen. If it feels like a cage, you're gone."),
        "power" => Some("You respect confidence and backbone. Weak energy annoys you."),
        "loyalty" => Some("You notice consistency. Loyalty isn't a word, it's behavior."),
        "silence" => Some("You retreat to protect your peace. You recharge in quiet."),
        "rage" => Some("You have a hard boundary line. Disrespect flips a switch."),
        "mercy" => Some("You're softer than you act. You care, even when you hide it."),
        "ambition" => Some("You're not here to drift. You're here to evolve."),
        _ => None,
    }
}

/// The follow-up question attached to a realm's reading.
#[must_use]
pub fn next_question(realm: &str) -> &'static str {
    match realm {
        "threshold" => {
            "What kind of trouble do you actually enjoy: witty, magnetic, mysterious, or safe?"
        }
        "lantern" => "What's your biggest green flag you rarely say out loud?",
        "mirror" => "What truth about you do people learn too late?",
        "veil" => "What do you want your life to feel like a year from now?",
        _ => "What's something you wish someone would ask you, but nobody does?",
    }
}

/// Short live hint shown beside the realm header, keyed by the currently
/// dominant signal category.
#[must_use]
pub fn gate_hint(top_signal: Option<&str>) -> &'static str {
    match top_signal {
        Some("playful") => "The Gate senses play in you.",
        Some("intuitive") => "The Gate notices how you read between lines.",
        Some("symbolic") => "The Gate likes your taste for symbols.",
        Some("grounded") => "The Gate respects your need for what's real.",
        Some("sensual") => "The Gate feels heat in the air.",
        Some("guarded") => "The Gate notices your boundaries.",
        Some("adventurous") => "The Gate likes movement and risk.",
        Some("devotion") => "The Gate values loyalty.",
        Some("mysterious") => "The Gate enjoys slow reveals.",
        Some("funny") => "The Gate approves of sharp humor.",
        _ => "The Gate watches quietly.",
    }
}
