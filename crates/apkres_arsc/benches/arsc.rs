use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod decode {
    use apkres_arsc::{DecodeOptions, ResourceTableDecoder, SurrogatePolicy};
    use divan::Bencher;

    fn get_input(name: &str) -> Vec<u8> {
        std::fs::read(format!(
            "{}/resources/{}",
            env!("CARGO_MANIFEST_DIR"),
            name
        ))
        .unwrap()
    }

    #[divan::bench(args = ["utf8.arsc", "utf16.arsc"])]
    fn table(bencher: Bencher, name: &str) {
        bencher
            .with_inputs(|| get_input(name))
            .bench_refs(|data| {
                divan::black_box(apkres_arsc::decode(data).unwrap());
            });
    }

    #[divan::bench]
    fn table_strict(bencher: Bencher) {
        let decoder = ResourceTableDecoder::new(
            DecodeOptions::builder()
                .surrogates(SurrogatePolicy::Strict)
                .build(),
        );

        bencher
            .with_inputs(|| get_input("utf16.arsc"))
            .bench_refs(|data| {
                divan::black_box(decoder.decode(data).unwrap());
            });
    }
}
