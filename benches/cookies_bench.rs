use cookiejar::cookies::jar::CookieJar;
use cookiejar::cookies::store::StorageKind;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

fn benchmark_cookie_insert(c: &mut Criterion) {
    let jar = CookieJar::new();
    let url = Url::parse("https://example.com").unwrap();

    c.bench_function("cookie_set_line", |b| {
        b.iter(|| {
            jar.set_cookie_lines(black_box(&url), [black_box("foo=bar; Path=/; Secure")]);
        })
    });
}

fn benchmark_cookie_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("cookies_for");
    let target = Url::parse("https://www.site7.example/foo/bar").unwrap();

    for (label, storage) in [("flat", StorageKind::Flat), ("boxed", StorageKind::Boxed)] {
        let jar = CookieJar::with_storage(storage);
        // 50 sites with 20 cookies each
        for site in 0..50 {
            let from = Url::parse(&format!("https://www.site{}.example/foo/", site)).unwrap();
            let lines: Vec<String> = (0..20)
                .map(|i| format!("cookie{}=val; Path=/foo; Domain=site{}.example", i, site))
                .collect();
            jar.set_cookie_lines(&from, &lines);
        }

        group.bench_function(label, |b| {
            b.iter(|| {
                black_box(jar.cookies_for(black_box(&target)));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_cookie_insert, benchmark_cookie_get);
criterion_main!(benches);
