//! This should fail: #[derive(ContentShape)] only works on structs

use kontent_delivery_macros::ContentShape;

#[derive(ContentShape)]
enum Roast {
    Light,
    Dark,
}

fn main() {}
