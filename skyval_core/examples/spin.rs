use skyval_core::{place, EngineParams, SeedStream, SlotSession};

fn main() {
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";

    for p in place(&["lavender", "rose", "tulip", "camellia", "sunflower"]) {
        println!(
            "{:<10} x={:>6.2} y={:>6.2} rot={:>5.2} scale={:.3} z={}",
            p.flower.id(),
            p.center_x,
            p.center_y,
            p.rotation,
            p.scale,
            p.stack_order
        );
    }

    let mut session = SlotSession::new(EngineParams::default());
    for nonce in 1..=5u64 {
        let mut rng = SeedStream::new(server_seed, client_seed, nonce);
        let Ok(settled) = session.spin_now(&mut rng) else {
            break;
        };
        println!(
            "server_seed_hash={} nonce={} {:?} -> {} (spins left {})",
            rng.server_seed_hash_hex(),
            nonce,
            settled.outcome.triple,
            settled.outcome.title(),
            settled.spins_left
        );
    }
}
