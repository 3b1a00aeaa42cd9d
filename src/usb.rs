//! USB CDC-ACM serial link for the serial bridge profile
//!
//! The host talks to the bridge over a virtual serial port. Incoming bytes
//! are assembled into lines and handed to the line protocol; replies and
//! unsolicited `BTN` reports share one writer.

use embassy_futures::select::{select, Either};
use embassy_rp::peripherals;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config};
use static_cell::StaticCell;

use crate::config::*;
use crate::context::Context;
use crate::protocol::{self, LineBuffer};

type UsbDriver = Driver<'static, peripherals::USB>;

/// Replies waiting for the writer
static REPLIES: Channel<CriticalSectionRawMutex, &'static str, LINK_REPLY_QUEUE> = Channel::new();

// ===================================================================
// USB Configuration
// ===================================================================

fn create_usb_config() -> Config<'static> {
    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some(USB_MANUFACTURER);
    config.product = Some(USB_PRODUCT);
    config.serial_number = Some(USB_SERIAL);
    config.max_power = 100; // 200mA
    config.max_packet_size_0 = USB_MAX_PACKET as u8;

    // Miscellaneous class with IADs, required for CDC on Windows
    config.device_class = 0xef;
    config.device_sub_class = 0x02;
    config.device_protocol = 0x01;
    config.composite_with_iads = true;

    config
}

// ===================================================================
// Link Halves
// ===================================================================

async fn read_commands(receiver: &mut Receiver<'static, UsbDriver>, ctx: &Context) -> Result<(), EndpointError> {
    let mut packet = [0u8; USB_MAX_PACKET as usize];
    let mut line = LineBuffer::<LINK_LINE_CAPACITY>::new();

    loop {
        let len = receiver.read_packet(&mut packet).await?;
        for &byte in &packet[..len] {
            let reply = match line.push(byte) {
                None => continue,
                Some(Ok(command)) => protocol::handle_line(&ctx.state, command.as_str()),
                Some(Err(error)) => {
                    warn!("Dropped link line: {:?}", error);
                    error.reply()
                }
            };
            REPLIES.send(reply).await;
        }
    }
}

async fn write_replies(sender: &mut Sender<'static, UsbDriver>, ctx: &Context) -> Result<(), EndpointError> {
    loop {
        match select(REPLIES.receive(), ctx.buttons.wait()).await {
            Either::First(reply) => sender.write_packet(reply.as_bytes()).await?,
            Either::Second(buttons) => {
                let report = protocol::format_buttons(&buttons);
                sender.write_packet(&report).await?;
                debug!("Button report sent");
            }
        }
    }
}

// ===================================================================
// USB Task Implementation
// ===================================================================

#[embassy_executor::task]
pub async fn serial_link_task(driver: UsbDriver, ctx: &'static Context) {
    info!("Serial link task started");

    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static MSOS_DESC: StaticCell<[u8; 64]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<State> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        create_usb_config(),
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        MSOS_DESC.init([0; 64]),
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), USB_MAX_PACKET);
    let mut usb = builder.build();
    let (mut sender, mut receiver) = class.split();

    let usb_fut = usb.run();

    let link_fut = async {
        loop {
            receiver.wait_connection().await;
            info!("Serial link connected");
            // Either half ending means the host went away
            let result = match select(read_commands(&mut receiver, ctx), write_replies(&mut sender, ctx)).await {
                Either::First(result) | Either::Second(result) => result,
            };
            if let Err(e) = result {
                warn!("Serial link closed: {:?}", e);
            }
            REPLIES.clear();
        }
    };

    embassy_futures::join::join(usb_fut, link_fut).await;
}
