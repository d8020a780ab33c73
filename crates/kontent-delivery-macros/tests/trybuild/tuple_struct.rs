//! This should fail: fields are bound by name

use kontent_delivery_macros::ContentShape;

#[derive(ContentShape)]
struct Price(String);

fn main() {}
