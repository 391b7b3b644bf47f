use std::error::Error;
use std::fs;
use std::path::Path;
use std::thread;

use log::{error, info, warn};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use vm8_core::constants::TIMER_RATE;
use vm8_core::{Machine, Step};
use vm8_display::Display;

use crate::keymap::keymap;
use crate::scheduler::FixedRate;

pub fn run(rom: &Path, clock_rate: u32, scale: u32) -> Result<(), Box<dyn Error>> {
    let mut machine = Machine::new();
    machine.load_program(&fs::read(rom)?)?;
    info!("loaded {}", rom.display());

    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump()?;

    // The executor and the timers tick at independent rates; the timer rate
    // is fixed at 60 Hz no matter how fast the executor runs.
    let mut executor = FixedRate::new(clock_rate);
    let mut timers = FixedRate::new(TIMER_RATE);

    'event: loop {
        // Drain host input into the keypad latch
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if key == Keycode::Escape {
                        break 'event;
                    }
                    if let Some(index) = keymap(key) {
                        machine.set_key(index, true);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(index) = keymap(key) {
                        machine.set_key(index, false);
                    }
                }
                _ => continue,
            }
        }

        for _ in 0..executor.due() {
            match machine.step() {
                Ok(Step::Unknown(word)) => warn!("skipped unknown word {:04X}", word),
                Ok(_) => {}
                Err(e) => {
                    error!("machine halted: {}", e);
                    break 'event;
                }
            }
        }

        for _ in 0..timers.due() {
            machine.tick_timers();
        }

        // Redraw only when the machine flags a change
        if let Some(frame) = machine.frame() {
            display.render(&frame)?;
        }

        thread::sleep(executor.until_next().min(timers.until_next()));
    }

    Ok(())
}
