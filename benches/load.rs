use criterion::{Criterion, criterion_group, criterion_main};
use loadenv::{EnvLoader, MemoryFs, TargetEnv};

fn bench_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let env_path = dir.path().join(".env");
    let content = make_env_content(2_000);
    std::fs::write(&env_path, &content).expect("failed to write bench file");

    c.bench_function("load_path_in_memory", |b| {
        b.iter(|| {
            let mut loader = EnvLoader::new().target(TargetEnv::memory());
            loader.load_path(&env_path).expect("load should succeed")
        });
    });

    let fs = MemoryFs::new().with_file(".env", content);
    c.bench_function("load_fs_without_override", |b| {
        b.iter(|| {
            let mut loader = EnvLoader::new()
                .target(TargetEnv::memory())
                .override_existing(false);
            loader.load_fs(&fs, ".env").expect("load should succeed")
        });
    });
}

fn make_env_content(entries: usize) -> String {
    let mut content = String::with_capacity(entries * 16);
    for idx in 0..entries {
        content.push_str("KEY_");
        content.push_str(&idx.to_string());
        content.push('=');
        content.push_str("value");
        content.push('\n');
    }
    content
}

criterion_group!(benches, bench_load);
criterion_main!(benches);
