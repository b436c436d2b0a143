// This binary crate is intentionally minimal.
// All classifier logic lives in the library (src/lib.rs and its modules).
// Run examples with:
//   cargo run --example xor
fn main() {
    println!("dnn-classifier: a feed-forward neural network classifier in Rust.");
    println!("Run `cargo run --example xor` to see the XOR demo.");
}
