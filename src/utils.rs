//! Identifier helpers

use uuid7::uuid7;

// time-ordered, so audit keys sort in the order updates were applied
pub fn new_update_id() -> String {
    uuid7().to_string()
}
