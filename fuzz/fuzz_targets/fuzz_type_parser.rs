//! Fuzz testing for the type grammar parser.
//!
//! Feeds arbitrary strings to the parser to ensure malformed declarations
//! are rejected gracefully without panicking, and that every accepted
//! declaration pretty-prints back to an equal tree.

#![no_main]

use libfuzzer_sys::fuzz_target;

use rowbin::parse_wire_type;

fuzz_target!(|input: &str| {
    if let Ok(parsed) = parse_wire_type(input) {
        let printed = parsed.to_string();
        let reparsed = parse_wire_type(&printed)
            .expect("canonical form of an accepted declaration must parse");
        assert_eq!(reparsed, parsed, "canonical form must round-trip");
    }
});
