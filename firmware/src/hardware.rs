//! ハードウェア初期化モジュール
//!
//! ペリフェラルの初期化ロジックを集約します。

use embassy_stm32::{
    bind_interrupts, can,
    gpio::{Level, Output, OutputType, Speed},
    peripherals,
    timer::{
        complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin},
        low_level::CountingMode,
        simple_pwm::PwmPin,
    },
    Config, Peri,
};

use crate::config;

// CANの割り込みをバインド
bind_interrupts!(pub struct Irqs {
    FDCAN1_IT0 => can::IT0InterruptHandler<peripherals::FDCAN1>;
    FDCAN1_IT1 => can::IT1InterruptHandler<peripherals::FDCAN1>;
});

/// RCCクロック設定を初期化
///
/// HSI → PLL（÷4 × 85 ÷ 2）で170MHz生成
pub fn create_clock_config() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::mux::{ClockMux, Fdcansel};
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllQDiv, PllRDiv, PllSource, Sysclk};

        config.rcc.hsi = true;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: Some(PllQDiv::DIV2), // FDCANクロック用
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R;

        let mut clock_mux = ClockMux::default();
        clock_mux.fdcansel = Fdcansel::PLL1_Q;
        config.rcc.mux = clock_mux;
    }
    config
}

/// TIM1 3相相補PWM初期化
///
/// U=PE9/PE8、V=PE11/PE10、W=PE13/PE12。全チャネル無効の状態で返す。
pub fn init_phase_pwm(
    tim: Peri<'static, peripherals::TIM1>,
    u_high: Peri<'static, peripherals::PE9>,
    u_low: Peri<'static, peripherals::PE8>,
    v_high: Peri<'static, peripherals::PE11>,
    v_low: Peri<'static, peripherals::PE10>,
    w_high: Peri<'static, peripherals::PE13>,
    w_low: Peri<'static, peripherals::PE12>,
) -> ComplementaryPwm<'static, peripherals::TIM1> {
    let mut pwm = ComplementaryPwm::new(
        tim,
        Some(PwmPin::new(u_high, OutputType::PushPull)),
        Some(ComplementaryPwmPin::new(u_low, OutputType::PushPull)),
        Some(PwmPin::new(v_high, OutputType::PushPull)),
        Some(ComplementaryPwmPin::new(v_low, OutputType::PushPull)),
        Some(PwmPin::new(w_high, OutputType::PushPull)),
        Some(ComplementaryPwmPin::new(w_low, OutputType::PushPull)),
        None,
        None,
        config::pwm::DEFAULT_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    pwm.set_dead_time(config::pwm::DEFAULT_DEAD_TIME);
    info!(
        "PWM initialized: {} Hz, max duty {}",
        config::pwm::DEFAULT_FREQUENCY.0,
        pwm.get_max_duty()
    );
    pwm
}

/// セクタ1マーカー出力（オシロスコープのトリガー用）
pub fn init_sector_marker(pin: Peri<'static, peripherals::PB9>) -> Output<'static> {
    Output::new(pin, Level::Low, Speed::VeryHigh)
}
