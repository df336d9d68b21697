use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_output, delegate_registry, delegate_seat,
    delegate_shm, delegate_layer, registry_handlers,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Modifiers},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            LayerShell, LayerShellHandler, LayerSurface, LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{slot::SlotPool, Shm, ShmHandler},
};
use wayland_client::{
    globals::GlobalList,
    protocol::{wl_keyboard::WlKeyboard, wl_output::{self, WlOutput}, wl_seat, wl_shm, wl_surface::WlSurface},
    Connection, QueueHandle,
};
use xkbcommon::xkb::{self, keysyms};
use anyhow::{Context, Result};
use crate::state::AppState;
use crate::ui::render::{ListWindow, Renderer};

type Qh = QueueHandle<WaylandApp>;

pub struct WaylandApp {
    pub registry_state: RegistryState,
    pub seat_state: SeatState,
    pub output_state: OutputState,
    pub compositor_state: CompositorState,
    pub shm_state: Shm,
    pub layer_shell_state: LayerShell,

    pub layer_surface: Option<LayerSurface>,
    pub pool: Option<SlotPool>,
    pub width: u32,
    pub height: u32,
    pub first_configure: bool,
    pub should_exit: bool,
    pub close_on_launch: bool,
    pub modifiers: Modifiers,

    pub state: AppState,
    pub renderer: Renderer,
}

impl WaylandApp {
    pub fn new(
        globals: &GlobalList,
        qh: &QueueHandle<Self>,
        state: AppState,
        renderer: Renderer,
        close_on_launch: bool,
    ) -> Result<Self> {
        let registry_state = RegistryState::new(globals);
        let seat_state = SeatState::new(globals, qh);
        let output_state = OutputState::new(globals, qh);
        let compositor_state = CompositorState::bind(globals, qh).context("wl_compositor not available")?;
        let shm_state = Shm::bind(globals, qh).context("wl_shm not available")?;
        let layer_shell_state = LayerShell::bind(globals, qh).context("zwlr_layer_shell_v1 not available")?;

        Ok(Self {
            registry_state,
            seat_state,
            output_state,
            compositor_state,
            shm_state,
            layer_shell_state,
            layer_surface: None,
            pool: None,
            width: 600,
            height: 650,
            first_configure: true,
            should_exit: false,
            close_on_launch,
            modifiers: Modifiers::default(),
            state,
            renderer,
        })
    }

    /// Launches the selection; the window only closes when the launch worked.
    fn launch_selected(&mut self) {
        if self.state.launch_selected().is_ok() && self.close_on_launch {
            self.should_exit = true;
        }
    }

    fn launch_visible_row(&mut self, row: usize) {
        let window = ListWindow::compute(
            self.renderer.theme(),
            self.height as f32,
            self.state.filtered.len(),
            self.state.selected_index,
        );
        if row < window.visible_items && self.state.select(window.scroll_offset + row) {
            self.launch_selected();
        }
    }

    fn handle_key(&mut self, event: KeyEvent) {
        let raw_sym = u32::from(event.keysym);
        match raw_sym {
            keysyms::KEY_Escape => self.should_exit = true,
            keysyms::KEY_Return | keysyms::KEY_KP_Enter => self.launch_selected(),
            keysyms::KEY_Up => self.state.move_selection(-1),
            keysyms::KEY_Down => self.state.move_selection(1),
            keysyms::KEY_BackSpace => self.state.pop_char(),
            keysyms::KEY_1..=keysyms::KEY_9 if self.modifiers.alt => {
                self.launch_visible_row((raw_sym - keysyms::KEY_1) as usize);
            }
            _ if self.modifiers.ctrl || self.modifiers.alt => {}
            _ => match event.utf8 {
                Some(text) if !text.chars().any(char::is_control) => self.state.push_str(&text),
                _ => {}
            },
        }
    }

    fn request_frame(&self, qh: &Qh) {
        if let Some(layer_surface) = &self.layer_surface {
            let surface = layer_surface.wl_surface();
            surface.frame(qh, surface.clone());
            surface.commit();
        }
    }

    pub fn draw(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>) {
        if let Some(layer_surface) = &self.layer_surface {
            let width = self.width;
            let height = self.height;
            if width == 0 || height == 0 { return; }
            
            let Some(pool) = self.pool.as_mut() else { return; };

            let (buffer, canvas) = match pool.create_buffer(
                width as i32,
                height as i32,
                (width * 4) as i32,
                wl_shm::Format::Argb8888,
            ) {
                Ok(pair) => pair,
                Err(err) => {
                    log::error!("Failed to create buffer: {}", err);
                    return;
                }
            };

            if let Some(mut pixmap) = tiny_skia::PixmapMut::from_bytes(canvas, width, height) {
                self.renderer.draw(&mut pixmap, &self.state);
                
                for chunk in canvas.chunks_exact_mut(4) {
                    chunk.swap(0, 2);
                }
                
                layer_surface.wl_surface().attach(Some(buffer.wl_buffer()), 0, 0);
                layer_surface.wl_surface().damage(0, 0, width as i32, height as i32);
                layer_surface.wl_surface().commit();
            }
        }
    }
}

impl LayerShellHandler for WaylandApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        if configure.new_size.0 > 0 {
            self.width = configure.new_size.0;
        }
        if configure.new_size.1 > 0 {
            self.height = configure.new_size.1;
        }

        if self.first_configure {
            self.first_configure = false;
            match SlotPool::new(self.width as usize * self.height as usize * 4, &self.shm_state) {
                Ok(pool) => self.pool = Some(pool),
                Err(err) => {
                    log::error!("Failed to create shm pool: {}", err);
                    self.should_exit = true;
                    return;
                }
            }
        }

        let needed = self.width as usize * self.height as usize * 4;
        if let Some(pool) = &mut self.pool {
            if pool.len() < needed {
                if let Err(err) = pool.resize(needed) {
                    log::error!("Failed to resize shm pool: {}", err);
                    self.should_exit = true;
                    return;
                }
            }
        }

        self.draw(conn, qh);
    }
}

// Only the frame callback matters; scale, transform and output changes are ignored.
impl CompositorHandler for WaylandApp {
    fn frame(&mut self, conn: &Connection, qh: &Qh, _: &WlSurface, _: u32) {
        self.draw(conn, qh);
    }

    fn scale_factor_changed(&mut self, _: &Connection, _: &Qh, _: &WlSurface, _: i32) {}
    fn transform_changed(&mut self, _: &Connection, _: &Qh, _: &WlSurface, _: wl_output::Transform) {}
    fn surface_enter(&mut self, _: &Connection, _: &Qh, _: &WlSurface, _: &WlOutput) {}
    fn surface_leave(&mut self, _: &Connection, _: &Qh, _: &WlSurface, _: &WlOutput) {}
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(&mut self, _: &Connection, _: &Qh, _: WlOutput) {}
    fn update_output(&mut self, _: &Connection, _: &Qh, _: WlOutput) {}
    fn output_destroyed(&mut self, _: &Connection, _: &Qh, _: WlOutput) {}
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_capability(&mut self, _: &Connection, qh: &Qh, seat: wl_seat::WlSeat, capability: Capability) {
        if capability != Capability::Keyboard {
            return;
        }
        match self.seat_state.get_keyboard(qh, &seat, None) {
            Ok(_) => log::debug!("Keyboard bound"),
            Err(err) => log::error!("Failed to bind keyboard: {}", err),
        }
    }

    fn new_seat(&mut self, _: &Connection, _: &Qh, _: wl_seat::WlSeat) {}
    fn remove_capability(&mut self, _: &Connection, _: &Qh, _: wl_seat::WlSeat, _: Capability) {}
    fn remove_seat(&mut self, _: &Connection, _: &Qh, _: wl_seat::WlSeat) {}
}

impl KeyboardHandler for WaylandApp {
    fn enter(&mut self, _: &Connection, _: &Qh, _: &WlKeyboard, _: &WlSurface, _: u32, _: &[u32], _: &[xkb::Keysym]) {}

    /// Losing focus closes the launcher, as clicking away from a menu would.
    fn leave(&mut self, _: &Connection, _: &Qh, _: &WlKeyboard, _: &WlSurface, _: u32) {
        self.should_exit = true;
    }

    fn press_key(&mut self, _: &Connection, qh: &Qh, _: &WlKeyboard, _: u32, event: KeyEvent) {
        self.handle_key(event);
        self.request_frame(qh);
    }

    fn release_key(&mut self, _: &Connection, _: &Qh, _: &WlKeyboard, _: u32, _: KeyEvent) {}

    fn update_modifiers(&mut self, _: &Connection, _: &Qh, _: &WlKeyboard, _: u32, modifiers: Modifiers, _: u32) {
        self.modifiers = modifiers;
    }
}

impl ShmHandler for WaylandApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm_state
    }
}

delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_shm!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_layer!(WaylandApp);
delegate_registry!(WaylandApp);

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}
