use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shako::{perft, Board, Move, Square};

fn bench_shallow_perft(c: &mut Criterion) {
    c.bench_function("shallow perft", |b| {
        b.iter(|| {
            let mut board = Board::new();
            assert_eq!(perft(black_box(&mut board), 3), 8902);
        })
    });
}

fn bench_push_pop(c: &mut Criterion) {
    let e4 = Move::Normal {
        from: Square::E2,
        to: Square::E4,
        promotion: None,
    };

    c.bench_function("push pop", |b| {
        b.iter(|| {
            let mut board = black_box(Board::new());
            board.push(black_box(e4)).expect("legal");
            board.pop().expect("stack is not empty");
            board
        })
    });
}

fn bench_play_sans(c: &mut Criterion) {
    let pgn = [
        "e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6", "Ng5", "d5", "exd5", "Na5", "Bb5+", "c6", "dxc6",
        "bxc6", "Ba4", "Ba6", "d3", "Bc5", "O-O", "O-O", "Nc3", "Qc7", "Nge4", "Be7", "Nxf6+",
        "Bxf6", "Ne4", "Be7", "Re1", "Rad8", "f3", "c5", "Be3", "c4", "Qc1", "cxd3", "cxd3", "Qb8",
    ];

    c.bench_function("play sans", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for san in black_box(pgn).iter() {
                board.push_san(san).expect("legal");
            }
            board
        })
    });
}

criterion_group!(benches, bench_shallow_perft, bench_push_pop, bench_play_sans);
criterion_main!(benches);
