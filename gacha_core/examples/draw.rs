use gacha_core::{demo_catalog, resolve_draw, SeededRng};

fn main() {
    // Example end-to-end draw against the demo catalog
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let nonce = 1u64;
    let mut rng = SeededRng::new(server_seed, client_seed, nonce);
    let catalog = demo_catalog();
    match resolve_draw(catalog.patterns(), 90.0, &mut rng) {
        Ok(outcome) => println!(
            "server_seed_hash={} pattern={} currency={} win={} payout={}",
            rng.server_seed_hash_hex(),
            outcome.pattern.id,
            outcome.pattern.currency,
            outcome.final_result,
            outcome.payout()
        ),
        Err(e) => eprintln!("draw failed: {e}"),
    }
}
