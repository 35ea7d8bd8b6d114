// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use log::LevelFilter;
use panic_halt as _;

use hal::{
    gpio::{Edge, ExtiPin},
    i2c::{BlockingI2c, Mode},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Event, Serial},
};
use stm32f7xx_hal as hal;

use balbot::config;
use balbot::drivers::{mpu6050, HBridge, Mpu6050};
use balbot::hw::{self, Bluetooth, CycleClock, Led, Usart};
use balbot::io::QuadEncoder;
use balbot::runtime::{self, ControlLoop, LoopConfig, LoopMode, Peripherals};

/// Loop behavior for this build.
const MODE: LoopMode = LoopMode::Balance;

#[entry]
fn main() -> ! {
    let (Some(dp), Some(mut cp)) = (pac::Peripherals::take(), cortex_m::Peripherals::take()) else {
        halt();
    };

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb1 = rcc.apb1;
    let mut apb2 = rcc.apb2;

    // GPIO
    let gpiob = dp.GPIOB.split();
    let gpiod = dp.GPIOD.split();
    let gpioe = dp.GPIOE.split();
    let gpiof = dp.GPIOF.split();

    // LD3 (red)
    let mut led = Led::active_high(gpiob.pb14.into_push_pull_output());

    // USART3 (ST-LINK VCP) as the log sink
    let tx = gpiod.pd8.into_alternate::<7>();
    let rx = gpiod.pd9.into_alternate::<7>();
    let debug_cfg = Config {
        baud_rate: config::DEBUG_BAUD.bps(),
        ..Default::default()
    };
    let debug = Usart::new(Serial::new(dp.USART3, (tx, rx), &clocks, debug_cfg));
    let _ = hw::usart::init_logger(debug, LevelFilter::Info);

    // I2C1 to the MPU-6050
    let scl = gpiob.pb8.into_alternate_open_drain::<4>();
    let sda = gpiob.pb9.into_alternate_open_drain::<4>();
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (scl, sda),
        Mode::fast(400_000.Hz()),
        &clocks,
        &mut apb1,
        10_000,
    );
    let mut imu = Mpu6050::new(i2c, mpu6050::ADDRESS)
        .with_gyro_offsets(mpu6050::GyroOffsets::from(&config::IMU));

    if runtime::bring_up(&mut imu, &mut led).is_err() {
        halt();
    }

    // TIM4 CH1/CH2 PWM, direction pins on GPIOF
    let pwm_pins = (
        gpiod.pd12.into_alternate::<2>(),
        gpiod.pd13.into_alternate::<2>(),
    );
    let (pwm_l, pwm_r) = dp.TIM4.pwm_hz(pwm_pins, 20.kHz(), &clocks).split();
    let motor_l = HBridge::new(
        pwm_l,
        gpiof.pf12.into_push_pull_output(),
        gpiof.pf13.into_push_pull_output(),
        config::motor::DIRECTION,
        config::motor::VB,
    );
    let motor_r = HBridge::new(
        pwm_r,
        gpiof.pf14.into_push_pull_output(),
        gpiof.pf15.into_push_pull_output(),
        config::motor::DIRECTION,
        config::motor::VB,
    );

    // Encoder channels on GPIOE, both edges
    let mut syscfg = dp.SYSCFG;
    let mut exti = dp.EXTI;
    let mut enc_l_a = gpioe.pe9.into_pull_up_input();
    let mut enc_l_b = gpioe.pe11.into_pull_up_input();
    let mut enc_r_a = gpioe.pe13.into_pull_up_input();
    let mut enc_r_b = gpioe.pe14.into_pull_up_input();
    enc_l_a.make_interrupt_source(&mut syscfg, &mut apb2);
    enc_l_a.trigger_on_edge(&mut exti, Edge::RisingFalling);
    enc_l_a.enable_interrupt(&mut exti);
    enc_l_b.make_interrupt_source(&mut syscfg, &mut apb2);
    enc_l_b.trigger_on_edge(&mut exti, Edge::RisingFalling);
    enc_l_b.enable_interrupt(&mut exti);
    enc_r_a.make_interrupt_source(&mut syscfg, &mut apb2);
    enc_r_a.trigger_on_edge(&mut exti, Edge::RisingFalling);
    enc_r_a.enable_interrupt(&mut exti);
    enc_r_b.make_interrupt_source(&mut syscfg, &mut apb2);
    enc_r_b.trigger_on_edge(&mut exti, Edge::RisingFalling);
    enc_r_b.enable_interrupt(&mut exti);
    hw::encoder::latch();

    // USART2 to the Bluetooth module
    let bt_tx = gpiod.pd5.into_alternate::<7>();
    let bt_rx = gpiod.pd6.into_alternate::<7>();
    let bt_cfg = Config {
        baud_rate: config::BLUETOOTH_BAUD.bps(),
        ..Default::default()
    };
    let mut bt_serial = Serial::new(dp.USART2, (bt_tx, bt_rx), &clocks, bt_cfg);
    bt_serial.listen(Event::Rxne);
    let (bt_tx, bt_rx) = bt_serial.split();
    let bluetooth = Bluetooth::new(bt_tx, bt_rx);

    let clock = CycleClock::new(&mut cp.DCB, &mut cp.DWT, clocks.sysclk().raw());

    // SAFETY: handlers only touch their own statics.
    unsafe {
        NVIC::unmask(pac::Interrupt::EXTI9_5);
        NVIC::unmask(pac::Interrupt::EXTI15_10);
        NVIC::unmask(pac::Interrupt::USART2);
    }

    log::info!("starting control loop in {:?} mode", MODE);

    let mut control = ControlLoop::new(
        MODE,
        LoopConfig::DEFAULT,
        config::BALANCE,
        config::IMU,
        config::motor::DIRECTION,
        Peripherals {
            imu,
            encoder_left: QuadEncoder::new(&hw::encoder::LEFT, config::motor::ENC_CPR),
            encoder_right: QuadEncoder::new(&hw::encoder::RIGHT, config::motor::ENC_CPR),
            motor_left: motor_l,
            motor_right: motor_r,
            transport: bluetooth,
            clock,
            indicator: led,
        },
    );
    control.run();

    log::info!("control loop halted");
    halt();
}

fn halt() -> ! {
    loop {
        cortex_m::asm::nop();
    }
}

#[interrupt]
fn EXTI9_5() {
    hw::encoder::on_exti();
}

#[interrupt]
fn EXTI15_10() {
    hw::encoder::on_exti();
}

#[interrupt]
fn USART2() {
    hw::bluetooth::on_rx_interrupt();
}
