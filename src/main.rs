// Thin delegating binary.
//
// The actual server assembly lives in the extracted `bridge-server` crate.
#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    bridge_server::run().await
}
