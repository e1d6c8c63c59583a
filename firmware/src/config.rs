//! ハードウェア設定パラメータ
//!
//! 駆動パラメータ（極対数、変調率など）は `sixstep::config` を参照。

use embassy_time::Duration;
use sixstep::DriveConfig;

/// 駆動設定（起動時に検証される）
pub const DRIVE: DriveConfig = DriveConfig::new();

/// PWM設定
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// PWM周波数（20kHz）
    pub const DEFAULT_FREQUENCY: Hertz = Hertz(sixstep::config::DEFAULT_PWM_FREQUENCY_HZ);

    /// デッドタイム
    pub const DEFAULT_DEAD_TIME: u16 = 100;
}

/// CAN設定
pub mod can {
    use embassy_time::Duration;

    /// CANビットレート（250kbps）
    pub const DEFAULT_BITRATE: u32 = 250_000;

    /// ステータス送信周期
    pub const STATUS_PERIOD: Duration = Duration::from_millis(100);
}

/// Hallエッジキューの深さ
pub const EDGE_QUEUE_DEPTH: usize = 32;

/// コマンドキューの深さ
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// 応答キューの深さ
pub const RESPONSE_QUEUE_DEPTH: usize = 4;

/// Hall入力のウォッチドッグ周期（この間エッジがなければ Unchanged イベントを送る）
pub const HALL_WATCHDOG: Duration = Duration::from_millis(100);
