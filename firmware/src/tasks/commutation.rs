//! コミュテーションタスク
//!
//! エッジキューからHallエッジを受け取り、セクタ切替を行います。
//! デコーダが未登録の間に届いたエッジは `Commutator` が無視します。

use crate::state::{COMMUTATOR, EDGE_QUEUE};

/// コミュテーションタスク
#[embassy_executor::task]
pub async fn commutation_task() {
    info!("Commutation task started");

    loop {
        let edge = EDGE_QUEUE.receive().await;
        if let Some(sector) = COMMUTATOR.handle_edge(&edge) {
            trace!("Sector {}", sector.number());
        }
    }
}
