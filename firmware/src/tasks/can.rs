//! CAN通信タスク
//!
//! コマンドの受信、非常停止、応答とステータスの送信を行います。

use embassy_futures::select::{select3, Either3};
use embassy_stm32::can;
use embassy_time::Ticker;
use embedded_can::{Id, StandardId};
use sixstep::{config::MODULATION_UNITY, Command};

use crate::can_protocol::{can_ids, encode_response, encode_status, parse_command_key, MotorStatus};
use crate::config;
use crate::state::{COMMAND_QUEUE, COMMUTATOR, RESPONSE_QUEUE};

/// CAN通信タスク - コマンド処理とステータス送信
#[embassy_executor::task]
pub async fn can_task(can: can::Can<'static>) {
    let (mut tx, mut rx, _properties) = can.split();

    info!("CAN task started");

    // ステータス送信用タイマー（100ms周期）
    let mut status_ticker = Ticker::every(config::can::STATUS_PERIOD);

    loop {
        match select3(rx.read(), RESPONSE_QUEUE.receive(), status_ticker.next()).await {
            // CANフレーム受信
            Either3::First(Ok(envelope)) => {
                let frame = envelope.frame;
                let data = frame.data();

                // IDを数値として取得
                let id_raw = match frame.header().id() {
                    Id::Standard(std_id) => std_id.as_raw() as u32,
                    Id::Extended(ext_id) => ext_id.as_raw(),
                };

                match id_raw {
                    can_ids::EMERGENCY_STOP => {
                        // 制御タスクを経由せず即座に全相OFF
                        COMMUTATOR.force_off();
                        warn!("Emergency stop received!");
                    }
                    can_ids::COMMAND => {
                        let Some(key) = parse_command_key(data) else {
                            error!("Command frame: no data");
                            continue;
                        };
                        // 端末から送られた改行は無視
                        if key == b'\n' || key == b'\r' {
                            continue;
                        }
                        match Command::from_key(key) {
                            Ok(command) => {
                                if COMMAND_QUEUE.try_send(command).is_err() {
                                    warn!("Command queue full, dropped {}", command);
                                }
                            }
                            Err(e) => {
                                warn!("{}", e);
                                send(&mut tx, can_ids::RESPONSE, &encode_response(&Err(e))).await;
                            }
                        }
                    }
                    _ => {
                        debug!("Unknown CAN ID: 0x{:03X}", id_raw);
                    }
                }
            }
            Either3::First(Err(e)) => {
                warn!("CAN RX error: {}", e);
            }
            // コマンド応答送信 (ID 0x201)
            Either3::Second(result) => {
                send(&mut tx, can_ids::RESPONSE, &encode_response(&result)).await;
            }
            // モーターステータス送信 (ID 0x200)
            Either3::Third(()) => {
                let status = MotorStatus {
                    state: COMMUTATOR.motor_state(),
                    sector: COMMUTATOR.sector(),
                    modulation_permille: (COMMUTATOR.modulation().get() / (MODULATION_UNITY / 1000))
                        as u16,
                    period_us: COMMUTATOR.average_period_us().unwrap_or(0),
                };
                let data = encode_status(&status);
                send(&mut tx, can_ids::STATUS, &(data, data.len())).await;
            }
        }
    }
}

/// 標準IDでデータフレームを送信（失敗は無視）
async fn send(tx: &mut can::CanTx<'static>, id: u32, payload: &([u8; 8], usize)) {
    let (data, len) = payload;
    if let Some(std_id) = StandardId::new(id as u16) {
        if let Ok(frame) = can::frame::Frame::new_data(Id::Standard(std_id), &data[..*len]) {
            let _ = tx.write(&frame).await;
        }
    }
}
