#![no_std]
#![no_main]

#[macro_use]
mod fmt;

mod can_protocol;
mod config;
mod hardware;
mod motor_driver;
mod state;
mod tasks;
mod timebase;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use embassy_executor::Spawner;
use embassy_stm32::{
    can,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
};
use embassy_time::{Duration, Timer};
use sixstep::HallLine;

use hardware::Irqs;
use state::COMMUTATOR;
use tasks::{can_task, commutation_task, control_task, hall_input_task, led_task};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let config = hardware::create_clock_config();
    let p = embassy_stm32::init(config);

    info!("═══════════════════════════════════════════════");
    info!("   Six-step BLDC driver • STM32G431VB @ 170MHz");
    info!("═══════════════════════════════════════════════");

    // PWMを全相OFFの状態でコミュテータに接続
    let pwm = hardware::init_phase_pwm(p.TIM1, p.PE9, p.PE8, p.PE11, p.PE10, p.PE13, p.PE12);
    let marker = hardware::init_sector_marker(p.PB9);
    COMMUTATOR.with_output(|driver| driver.attach(pwm, marker));
    COMMUTATOR.force_off();

    // LED初期化＆タスク起動
    let led1 = Output::new(p.PC13, Level::High, Speed::Low);
    let led2 = Output::new(p.PC14, Level::Low, Speed::Low);
    let led3 = Output::new(p.PC15, Level::Low, Speed::Low);
    spawner.spawn(led_task(led1, led2, led3)).unwrap();

    // Hall入力（PB6=H1/A、PB7=H2/B、PB8=H3/C）
    let hall_a = ExtiInput::new(p.PB6, p.EXTI6, Pull::None);
    let hall_b = ExtiInput::new(p.PB7, p.EXTI7, Pull::None);
    let hall_c = ExtiInput::new(p.PB8, p.EXTI8, Pull::None);

    spawner.spawn(commutation_task()).unwrap();
    spawner.spawn(hall_input_task(hall_a, HallLine::A)).unwrap();
    spawner.spawn(hall_input_task(hall_b, HallLine::B)).unwrap();
    spawner.spawn(hall_input_task(hall_c, HallLine::C)).unwrap();
    spawner.spawn(control_task()).unwrap();

    // CAN初期化＆タスク起動
    let mut can_configurator = can::CanConfigurator::new(p.FDCAN1, p.PA11, p.PA12, Irqs);
    can_configurator.properties().set_standard_filter(
        can::filter::StandardFilterSlot::_0,
        can::filter::StandardFilter::accept_all_into_fifo0(),
    );
    can_configurator.set_bitrate(config::can::DEFAULT_BITRATE);
    let can = can_configurator.start(can::OperatingMode::NormalOperationMode);
    spawner.spawn(can_task(can)).unwrap();

    info!("Ready: send command keys on CAN ID 0x100");

    // メインループ（エッジ破棄の監視）
    let mut reported = 0;
    loop {
        Timer::after(Duration::from_millis(1000)).await;
        let dropped = COMMUTATOR.dropped_edges();
        if dropped != reported {
            warn!("Dropped hall edges: {}", dropped);
            reported = dropped;
        }
    }
}
