//! モータードライバー抽象化レイヤー
//!
//! TIM1のComplementaryPwmを `PhaseOutput` として公開します。
//! チャネルを無効化した相はハイ側・ロー側とも OFF（フローティング）になります。

use embassy_stm32::{
    gpio::Output,
    peripherals,
    timer::{complementary_pwm::ComplementaryPwm, Channel},
};
use sixstep::{Phase, PhaseOutput};

/// 3相モータードライバー
///
/// `static` に置くため PWM は後から `attach` する。未接続の間は全操作が無視される。
pub struct MotorDriver {
    pwm: Option<ComplementaryPwm<'static, peripherals::TIM1>>,
    marker: Option<Output<'static>>,
    max_duty: u16,
}

impl MotorDriver {
    pub const fn new() -> Self {
        Self {
            pwm: None,
            marker: None,
            max_duty: 0,
        }
    }

    /// PWMとセクタ1マーカー出力を接続
    ///
    /// 全チャネルを無効化・Duty 0 にした状態で接続する。
    pub fn attach(
        &mut self,
        mut pwm: ComplementaryPwm<'static, peripherals::TIM1>,
        marker: Output<'static>,
    ) {
        for phase in Phase::ALL {
            let ch = channel(phase);
            pwm.disable(ch);
            pwm.set_duty(ch, 0);
        }
        self.max_duty = pwm.get_max_duty();
        self.pwm = Some(pwm);
        self.marker = Some(marker);
    }
}

/// 相 → TIM1チャネル（U=CH1, V=CH2, W=CH3）
const fn channel(phase: Phase) -> Channel {
    match phase {
        Phase::U => Channel::Ch1,
        Phase::V => Channel::Ch2,
        Phase::W => Channel::Ch3,
    }
}

impl PhaseOutput for MotorDriver {
    fn max_duty(&self) -> u16 {
        self.max_duty
    }

    fn set_duty(&mut self, phase: Phase, duty: u16) {
        if let Some(pwm) = self.pwm.as_mut() {
            pwm.set_duty(channel(phase), duty);
        }
    }

    fn set_enable(&mut self, phase: Phase, enabled: bool) {
        if let Some(pwm) = self.pwm.as_mut() {
            if enabled {
                pwm.enable(channel(phase));
            } else {
                pwm.disable(channel(phase));
            }
        }
    }

    fn set_sector_marker(&mut self, high: bool) {
        if let Some(marker) = self.marker.as_mut() {
            if high {
                marker.set_high();
            } else {
                marker.set_low();
            }
        }
    }
}
