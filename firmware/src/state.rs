//! グローバル共有状態
//!
//! 制御ループとエッジコンテキストが共有するコミュテータ本体と、
//! タスク間のキューを定義します。

use core::sync::atomic::AtomicU8;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use sixstep::{Command, Commutator, Error, HallEdge, Response};

use crate::config::{COMMAND_QUEUE_DEPTH, EDGE_QUEUE_DEPTH, RESPONSE_QUEUE_DEPTH};
use crate::motor_driver::MotorDriver;

/// コミュテーション状態（出力段、Hallデコーダ、速度フィルタ、変調率）
///
/// PWMは起動時に `MotorDriver::attach` で接続する。
pub static COMMUTATOR: Commutator<CriticalSectionRawMutex, MotorDriver> =
    Commutator::new(MotorDriver::new());

/// Hall入力タスクがラッチした各線のレベル（`HallCode` のビット列）
pub static HALL_LEVELS: AtomicU8 = AtomicU8::new(0);

/// Hall入力タスク → コミュテーションタスク
pub static EDGE_QUEUE: Channel<CriticalSectionRawMutex, HallEdge, EDGE_QUEUE_DEPTH> =
    Channel::new();

/// CANタスク → 制御タスク
pub static COMMAND_QUEUE: Channel<CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH> =
    Channel::new();

/// 制御タスク → CANタスク
pub static RESPONSE_QUEUE: Channel<
    CriticalSectionRawMutex,
    Result<Response, Error>,
    RESPONSE_QUEUE_DEPTH,
> = Channel::new();
