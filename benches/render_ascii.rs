use std::io::Cursor;
use std::num::NonZeroU32;

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tgconsole::client::{Dialog, Peer};
use tgconsole::core::app::ChatView;
use tgconsole::core::history::RenderedMessage;
use tgconsole::media::render;
use tgconsole::ui::renderer::transcript_lines;
use tgconsole::ui::theme::Theme;

fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let v = ((x + y) * 255 / (width + height)) as u8;
        Rgb([v, v / 2, 255 - v])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

fn bench_render_widths(c: &mut Criterion) {
    let photo = gradient_png(1280, 960);
    let mut group = c.benchmark_group("render_photo");
    group.throughput(Throughput::Bytes(photo.len() as u64));

    for width in [20u32, 40, 80, 160] {
        let width = NonZeroU32::new(width).expect("non-zero width");
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| render(&photo, width).expect("render"))
        });
    }
    group.finish();
}

fn bench_transcript(c: &mut Criterion) {
    let art = render(&gradient_png(320, 240), NonZeroU32::new(40).expect("width")).expect("art");
    let dialog = Dialog {
        chat_id: 1,
        peer: Peer::Group {
            title: "Bench".into(),
        },
        unread_count: 0,
        folder_id: None,
        last_message_date: None,
    };
    let theme = Theme::dark_default();

    for count in [50usize, 200] {
        let mut view = ChatView::new(dialog.clone());
        let page = (0..count)
            .rev()
            .map(|i| RenderedMessage {
                id: i as i32,
                sender: "Someone".into(),
                date: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
                text: "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod"
                    .into(),
                media: (i % 5 == 0).then(|| art.clone()),
            })
            .collect();
        view.replace_history(page);

        c.bench_function(&format!("transcript_lines_{count}"), |b| {
            b.iter(|| transcript_lines(&view, 80, &theme))
        });
    }
}

criterion_group!(benches, bench_render_widths, bench_transcript);
criterion_main!(benches);
