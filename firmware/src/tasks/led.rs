//! LED制御タスク
//!
//! モーター状態をLEDで表示します。
//! - LED1: 停止中
//! - LED2: 強制転流中（点滅）
//! - LED3: Hallセンサー転流中

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};
use sixstep::MotorState;

use crate::state::COMMUTATOR;

/// LED制御タスク
///
/// 100msごとに公開されたモーター状態を読み取り、LEDに反映します。
#[embassy_executor::task]
pub async fn led_task(
    mut led1: Output<'static>,
    mut led2: Output<'static>,
    mut led3: Output<'static>,
) {
    info!("LED task started");

    loop {
        match COMMUTATOR.motor_state() {
            MotorState::Stopped => {
                led1.set_high();
                led2.set_low();
                led3.set_low();
            }
            MotorState::ForcedStart => {
                led1.set_low();
                led2.toggle();
                led3.set_low();
            }
            MotorState::ClosedLoopRunning => {
                led1.set_low();
                led2.set_low();
                led3.set_high();
            }
        }
        Timer::after(Duration::from_millis(100)).await;
    }
}
