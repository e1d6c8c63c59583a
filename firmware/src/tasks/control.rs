//! 制御タスク
//!
//! コマンドキューからオペレーターコマンドを受け取り、
//! `CommutationSupervisor` で状態遷移を実行して応答を返します。

use sixstep::{CommutationSupervisor, Response};

use crate::config::DRIVE;
use crate::state::{COMMAND_QUEUE, COMMUTATOR, RESPONSE_QUEUE};
use crate::tasks::hall_input::LatchedHallLevels;
use crate::timebase::EmbassyTimebase;

/// 制御タスク - Shutdown を受けるまでコマンドを処理する
#[embassy_executor::task]
pub async fn control_task() {
    let supervisor = CommutationSupervisor::new(&COMMUTATOR, LatchedHallLevels, DRIVE);
    let mut supervisor = match supervisor {
        Ok(supervisor) => supervisor,
        Err(e) => {
            error!("Invalid drive configuration: {}", e);
            return;
        }
    };
    let mut timer = EmbassyTimebase;

    info!(
        "Control task started: {} pole pairs, {} forced steps",
        DRIVE.pole_pairs,
        DRIVE.forced_steps()
    );

    loop {
        let command = COMMAND_QUEUE.receive().await;
        info!("Command: {}", command);

        let result = supervisor.execute(command, &mut timer).await;
        match &result {
            Ok(response) => info!("Response: {}", response),
            Err(e) => warn!("Command failed: {}", e),
        }

        let shut_down = matches!(result, Ok(Response::ShutDown));
        RESPONSE_QUEUE.send(result).await;
        if shut_down {
            break;
        }
    }

    info!("Control task finished");
}
