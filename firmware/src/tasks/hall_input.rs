//! Hall入力タスク（エッジコンテキスト）
//!
//! EXTIで各Hall線のエッジを待ち、タイムスタンプ付きでエッジキューへ送ります。
//! キューが満杯の場合はブロックせずに破棄し、破棄数をカウントします。
//! 各線の現在レベルは `HALL_LEVELS` にラッチし、起動時のシードに使います。

use core::sync::atomic::Ordering;

use embassy_stm32::exti::ExtiInput;
use embassy_time::{with_timeout, Instant};
use sixstep::{HallCode, HallEdge, HallInput, HallLevel, HallLine};

use crate::config::HALL_WATCHDOG;
use crate::state::{COMMUTATOR, EDGE_QUEUE, HALL_LEVELS};

/// `HALL_LEVELS` から読む `HallInput` 実装
pub struct LatchedHallLevels;

impl HallInput for LatchedHallLevels {
    fn read(&mut self) -> HallCode {
        HallCode::new(HALL_LEVELS.load(Ordering::Acquire))
    }
}

/// エッジのレベルを `HALL_LEVELS` に反映
fn latch(edge: &HallEdge) {
    let _ = HALL_LEVELS.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
        Some(HallCode::new(bits).with_edge(edge).bits())
    });
}

/// Hall入力タスク（1線につき1インスタンス）
///
/// `HALL_WATCHDOG` の間エッジがなければ `HallLevel::Unchanged` を送る。
#[embassy_executor::task(pool_size = 3)]
pub async fn hall_input_task(mut pin: ExtiInput<'static>, line: HallLine) {
    let level = HallLevel::from_bool(pin.is_high());
    latch(&HallEdge::new(line, level, Instant::now()));
    info!("Hall input task started: {} {}", line, level);

    loop {
        let level = match with_timeout(HALL_WATCHDOG, pin.wait_for_any_edge()).await {
            Ok(()) => HallLevel::from_bool(pin.is_high()),
            Err(_) => {
                // 取りこぼしたエッジがあればラッチだけ実レベルに合わせる
                let actual = HallLevel::from_bool(pin.is_high());
                latch(&HallEdge::new(line, actual, Instant::now()));
                HallLevel::Unchanged
            }
        };
        let edge = HallEdge::new(line, level, Instant::now());
        latch(&edge);

        if EDGE_QUEUE.try_send(edge).is_err() {
            COMMUTATOR.note_dropped_edge();
            warn!(
                "Edge queue full, dropped {} edges so far",
                COMMUTATOR.dropped_edges()
            );
        }
    }
}
